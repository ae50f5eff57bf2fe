use std::collections::BTreeSet;

use crate::error::{PceError, PceResult};

const MIN_VLAN: i32 = 1;
const MAX_VLAN: i32 = 4094;

/// Parses a VLAN expression into the set of VLAN ids it names.
///
/// Accepted forms are comma separated single ids and inclusive ranges (`"100"`,
/// `"100-105"`, `"100,200-202"`). An empty expression, `"*"` or `"any"` does not request a
/// specific VLAN and yields the empty set.
pub fn parse_vlan_expression(expression: &str) -> PceResult<BTreeSet<i32>> {
    let trimmed = expression.trim();
    if trimmed.is_empty() || trimmed == "*" || trimmed.eq_ignore_ascii_case("any") {
        return Ok(BTreeSet::new());
    }

    let mut vlans = BTreeSet::new();

    for part in trimmed.split(',') {
        let part = part.trim();
        let (floor, ceiling) = match part.split_once('-') {
            Some((floor, ceiling)) => (parse_vlan_id(floor, expression)?, parse_vlan_id(ceiling, expression)?),
            None => {
                let vlan = parse_vlan_id(part, expression)?;
                (vlan, vlan)
            }
        };

        if floor > ceiling {
            return Err(PceError::InvalidVlanExpression(expression.to_string()));
        }
        vlans.extend(floor..=ceiling);
    }

    Ok(vlans)
}

fn parse_vlan_id(token: &str, expression: &str) -> PceResult<i32> {
    let vlan: i32 = token.trim().parse().map_err(|_| PceError::InvalidVlanExpression(expression.to_string()))?;

    if !(MIN_VLAN..=MAX_VLAN).contains(&vlan) {
        return Err(PceError::InvalidVlanExpression(expression.to_string()));
    }
    Ok(vlan)
}
