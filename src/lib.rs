pub mod explorer;
pub mod graph_utils;
pub mod persistence;
