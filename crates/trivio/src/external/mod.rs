//! Clients for third-party APIs, built on [`crate::RetryingRequester`].

mod email;

pub use email::{
    CLEARBIT_ENRICHMENT_URL, EmailEnricher, EmailVerifier, HUNTER_VERIFIER_URL, is_well_formed_email,
};
