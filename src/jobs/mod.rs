pub mod slot_closer;
