pub mod include_scan;
pub mod path;
pub mod scope_tree;
pub mod trace;
