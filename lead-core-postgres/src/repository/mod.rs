pub mod db_init;
pub mod lead;
