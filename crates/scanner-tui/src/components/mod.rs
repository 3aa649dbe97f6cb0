pub mod channel_table;
pub mod header;
