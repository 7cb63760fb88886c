pub mod ctrl_flags;
pub mod debug;
pub mod decode;
pub mod phases;
pub mod table;
