pub mod access;
pub mod principal;
