//! Credential-resolution policy
//!
//! The access/secret configuration values double as a mode selector: three
//! reserved tokens pick an ambient credential source, anything else is taken
//! literally as a static key pair. Pairing is validated up front — using a
//! reserved token in only one of the two slots is a configuration error,
//! caught before any network call.

use crate::error::EmitterError;
use aws_config::environment::EnvironmentVariableCredentialsProvider;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;

/// Reserved token: read the shared credentials/profile file
pub const TOKEN_PROFILE_FILE: &str = "cpf";
/// Reserved token: use the host's attached IAM role (IMDS)
pub const TOKEN_INSTANCE_ROLE: &str = "iam";
/// Reserved token: read keys from the process environment
pub const TOKEN_ENVIRONMENT: &str = "env";

/// Resolved authentication strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialMode {
    /// Shared credentials/profile file (`"cpf"`)
    ProfileFile,
    /// Host instance role via IMDS (`"iam"`)
    InstanceRole,
    /// Process environment variables (`"env"`)
    Environment,
    /// Literal static key pair
    Static {
        access_key: String,
        secret_key: String,
    },
}

fn is_reserved(value: &str) -> bool {
    matches!(value, TOKEN_PROFILE_FILE | TOKEN_INSTANCE_ROLE | TOKEN_ENVIRONMENT)
}

impl CredentialMode {
    /// Resolve the authentication strategy from the configured key pair.
    ///
    /// Reserved tokens must appear in both slots and must agree; a mismatch
    /// fails fast with a configuration error.
    pub fn resolve(access_key: &str, secret_key: &str) -> Result<Self, EmitterError> {
        if (is_reserved(access_key) || is_reserved(secret_key)) && access_key != secret_key {
            return Err(EmitterError::Config(format!(
                "credential tokens must be paired: access-key '{access_key}' and \
                 secret-key '{secret_key}' disagree on the credential mode"
            )));
        }

        Ok(match access_key {
            TOKEN_PROFILE_FILE => Self::ProfileFile,
            TOKEN_INSTANCE_ROLE => Self::InstanceRole,
            TOKEN_ENVIRONMENT => Self::Environment,
            _ => Self::Static {
                access_key: access_key.to_string(),
                secret_key: secret_key.to_string(),
            },
        })
    }

    /// Static label for logging. Never includes key material.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProfileFile => "profile-file",
            Self::InstanceRole => "instance-role",
            Self::Environment => "environment",
            Self::Static { .. } => "static",
        }
    }

    /// Build the credentials provider for this mode.
    pub fn provider(&self) -> SharedCredentialsProvider {
        match self {
            Self::ProfileFile => {
                SharedCredentialsProvider::new(ProfileFileCredentialsProvider::builder().build())
            }
            Self::InstanceRole => {
                SharedCredentialsProvider::new(ImdsCredentialsProvider::builder().build())
            }
            Self::Environment => {
                SharedCredentialsProvider::new(EnvironmentVariableCredentialsProvider::new())
            }
            Self::Static {
                access_key,
                secret_key,
            } => SharedCredentialsProvider::new(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "kinesis-emitter-static",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESERVED: [&str; 3] = [TOKEN_PROFILE_FILE, TOKEN_INSTANCE_ROLE, TOKEN_ENVIRONMENT];

    #[test]
    fn matching_reserved_pairs_select_their_mode() {
        assert_eq!(
            CredentialMode::resolve("cpf", "cpf").unwrap(),
            CredentialMode::ProfileFile
        );
        assert_eq!(
            CredentialMode::resolve("iam", "iam").unwrap(),
            CredentialMode::InstanceRole
        );
        assert_eq!(
            CredentialMode::resolve("env", "env").unwrap(),
            CredentialMode::Environment
        );
    }

    #[test]
    fn any_disagreeing_reserved_pairing_is_a_config_error() {
        for token in RESERVED {
            // Reserved token on one side only, either slot
            assert!(matches!(
                CredentialMode::resolve(token, "static-secret"),
                Err(EmitterError::Config(_))
            ));
            assert!(matches!(
                CredentialMode::resolve("AKIAEXAMPLE", token),
                Err(EmitterError::Config(_))
            ));
        }

        // Two different reserved tokens
        for a in RESERVED {
            for b in RESERVED {
                if a != b {
                    assert!(matches!(
                        CredentialMode::resolve(a, b),
                        Err(EmitterError::Config(_))
                    ));
                }
            }
        }
    }

    #[test]
    fn non_reserved_literals_become_a_static_pair() {
        let mode = CredentialMode::resolve("AKIAEXAMPLE", "wJalrXUtnFEMI").unwrap();
        assert_eq!(
            mode,
            CredentialMode::Static {
                access_key: "AKIAEXAMPLE".to_string(),
                secret_key: "wJalrXUtnFEMI".to_string(),
            }
        );
    }

    #[test]
    fn reserved_tokens_are_case_sensitive() {
        // "IAM" is not a reserved token, so this is a valid static pair
        let mode = CredentialMode::resolve("IAM", "IAM").unwrap();
        assert!(matches!(mode, CredentialMode::Static { .. }));
    }

    #[test]
    fn environment_mode_constructs_no_static_pair() {
        let mode = CredentialMode::resolve("env", "env").unwrap();
        assert!(!matches!(mode, CredentialMode::Static { .. }));
    }
}
