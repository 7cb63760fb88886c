pub mod insts;
pub mod reg;
