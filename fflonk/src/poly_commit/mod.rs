/// Module for polynomial commitment errors.
pub mod errors;

/// Module for fflonk folding of polynomial packs.
pub mod fold;

/// Module for KZG polynomial commitment scheme.
pub mod kzg_poly_com;

/// Module for multi-point batch openings.
pub mod shplonk;
