pub const DEFAULT_FOLDS: usize = 10;
pub const N_NODES_LIMIT: usize = 8192;
pub const CP_TIE_EPS: f64 = 1e-12;
