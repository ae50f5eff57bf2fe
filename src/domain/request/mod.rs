pub mod route_request;
pub mod vlan_expression;
