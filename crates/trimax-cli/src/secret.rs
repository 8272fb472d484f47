//! Random signing secrets for the backend's JWT plugin configuration.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

/// Default secret size in bytes
pub const DEFAULT_SECRET_BYTES: usize = 64;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

pub fn hex_secret(len: usize) -> String {
    random_bytes(len).iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn base64_secret(len: usize) -> String {
    STANDARD.encode(random_bytes(len))
}

pub fn print_secrets(len: usize) {
    println!("Copy one of these keys into the backend configuration:\n");
    println!("Hex (recommended):");
    println!("JWT_SECRET_KEY={}\n", hex_secret(len));
    println!("Base64:");
    println!("JWT_SECRET_KEY={}\n", base64_secret(len));
    println!("Use a different key per environment and keep it out of version control.");
}
