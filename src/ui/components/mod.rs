pub mod arcade_field;
pub mod chart;
pub mod history_table;
pub mod menu;
pub mod stats_sidebar;
pub mod typing_area;
