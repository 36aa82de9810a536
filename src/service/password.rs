use crate::error::GuessError;
use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use std::time::Duration;
use tokio::task;
use tracing::warn;

/// Argon2id cost parameters plus the wall-clock budget for one hash or verify call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingOptions {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub timeout: Duration,
}

impl Default for HashingOptions {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Salted Argon2id hashing, run on the blocking pool so async callers are not stalled.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
    timeout: Duration,
}

impl PasswordService {
    pub fn new(opts: HashingOptions) -> Result<Self, GuessError> {
        let params = Params::new(opts.memory_kib, opts.iterations, opts.parallelism, None)
            .map_err(|e| GuessError::HashingFailure(format!("invalid argon2 params: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            timeout: opts.timeout,
        })
    }

    /// Hash `password` with a fresh salt into a self-describing PHC string.
    pub async fn hash(&self, password: &str) -> Result<String, GuessError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        self.run_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            let hash = argon2.hash_password(password.as_bytes(), &salt)?;
            Ok(hash.to_string())
        })
        .await
    }

    /// Check `password` against a stored PHC string. A mismatch is `Ok(false)`.
    pub async fn verify(&self, stored_hash: &str, password: &str) -> Result<bool, GuessError> {
        let argon2 = self.argon2.clone();
        let stored_hash = stored_hash.to_owned();
        let password = password.to_owned();
        self.run_blocking(move || {
            let parsed = PasswordHash::new(&stored_hash)?;
            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(HashError::Password) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    // The blocking task is not cancelled on timeout; its result is dropped.
    async fn run_blocking<T, F>(&self, f: F) -> Result<T, GuessError>
    where
        F: FnOnce() -> Result<T, GuessError> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::time::timeout(self.timeout, task::spawn_blocking(f)).await {
            Ok(Ok(res)) => res,
            Ok(Err(join_err)) => Err(GuessError::HashingFailure(format!(
                "hashing task failed: {join_err}"
            ))),
            Err(_) => {
                warn!(timeout = ?self.timeout, "password hashing timed out");
                Err(GuessError::HashingTimeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> HashingOptions {
        HashingOptions {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            timeout: Duration::from_secs(30),
        }
    }

    #[tokio::test]
    async fn hash_embeds_salt_and_params() {
        let svc = PasswordService::new(cheap()).unwrap();
        let a = svc.hash("hunter2").await.unwrap();
        let b = svc.hash("hunter2").await.unwrap();

        assert!(a.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert_ne!(a, b, "each hash must carry its own salt");
        assert!(svc.verify(&a, "hunter2").await.unwrap());
        assert!(svc.verify(&b, "hunter2").await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_is_not_an_error() {
        let svc = PasswordService::new(cheap()).unwrap();
        let h = svc.hash("correct horse").await.unwrap();
        assert!(!svc.verify(&h, "battery staple").await.unwrap());
    }

    #[tokio::test]
    async fn verify_uses_params_from_stored_hash() {
        let strong = PasswordService::new(HashingOptions {
            memory_kib: 2048,
            iterations: 2,
            ..cheap()
        })
        .unwrap();
        let h = strong.hash("pw").await.unwrap();

        let svc = PasswordService::new(cheap()).unwrap();
        assert!(svc.verify(&h, "pw").await.unwrap());
    }

    #[tokio::test]
    async fn malformed_stored_hash_is_hashing_failure() {
        let svc = PasswordService::new(cheap()).unwrap();
        let err = svc.verify("not-a-phc-string", "pw").await.unwrap_err();
        assert!(matches!(err, GuessError::HashingFailure(_)));
    }

    // 64 MiB x 3 passes takes far longer than a millisecond on any hardware.
    fn expensive(timeout: Duration) -> HashingOptions {
        HashingOptions {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 1,
            timeout,
        }
    }

    #[tokio::test]
    async fn slow_hash_reports_timeout() {
        let timeout = Duration::from_millis(1);
        let svc = PasswordService::new(expensive(timeout)).unwrap();
        let err = svc.hash("pw").await.unwrap_err();
        assert!(matches!(err, GuessError::HashingTimeout(d) if d == timeout));
    }

    #[tokio::test]
    async fn zero_timeout_reports_timeout() {
        let svc = PasswordService::new(expensive(Duration::ZERO)).unwrap();
        let err = svc.hash("pw").await.unwrap_err();
        assert!(matches!(err, GuessError::HashingTimeout(d) if d == Duration::ZERO));
    }

    #[test]
    fn rejects_invalid_params() {
        let res = PasswordService::new(HashingOptions {
            parallelism: 0,
            ..cheap()
        });
        assert!(matches!(res, Err(GuessError::HashingFailure(_))));
    }
}
