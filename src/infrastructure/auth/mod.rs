mod static_verifier;

pub use static_verifier::StaticTokenVerifier;
