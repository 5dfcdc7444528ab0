pub(crate) mod check_relation;
pub(crate) mod reconcile;
pub(crate) mod render;
