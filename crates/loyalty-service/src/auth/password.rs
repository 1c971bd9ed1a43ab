//! 密码处理
//!
//! 哈希格式为 `1:` + base64(Argon2id(password, secret))，secret 同时
//! 充当盐。`1:` 前缀为将来引入新哈希方案预留版本位。

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::ServiceError;

/// 版本前缀，标记哈希方案
const SCHEME_PREFIX: &str = "1:";

/// Argon2id 参数
///
/// 刻意温和（16 MiB / t=1 / p=2），方便在资源受限的容器里跑；
/// 生产部署应把内存成本提到 64 MiB 以上。
const MEMORY_KIB: u32 = 16 * 1024;
const ITERATIONS: u32 = 1;
const PARALLELISM: u32 = 2;
const OUTPUT_LEN: usize = 32;

/// 对密码进行哈希处理
pub fn hash_password(password: &str, secret: &str) -> Result<String, ServiceError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; OUTPUT_LEN];
    argon
        .hash_password_into(password.as_bytes(), secret.as_bytes(), &mut output)
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))?;

    Ok(format!("{SCHEME_PREFIX}{}", STANDARD.encode(output)))
}

/// 验证密码
///
/// 重新计算候选密码的哈希并与存储值做常数时间比较。
pub fn verify_password(
    password: &str,
    secret: &str,
    stored_hash: &str,
) -> Result<bool, ServiceError> {
    let candidate = hash_password(password, secret)?;
    Ok(constant_time_eq(
        candidate.as_bytes(),
        stored_hash.as_bytes(),
    ))
}

/// 常数时间字节比较
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "forum-prefix-guitar";

    #[test]
    fn test_hash_is_deterministic_and_prefixed() {
        let first = hash_password("p", SECRET).unwrap();
        let second = hash_password("p", SECRET).unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("1:"));
        // 32 字节输出的 base64 长度固定为 44
        assert_eq!(first.len(), 2 + 44);
    }

    #[test]
    fn test_hash_depends_on_secret() {
        let a = hash_password("p", SECRET).unwrap();
        let b = hash_password("p", "another-secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let stored = hash_password("correct horse", SECRET).unwrap();

        assert!(verify_password("correct horse", SECRET, &stored).unwrap());
        assert!(!verify_password("battery staple", SECRET, &stored).unwrap());
        assert!(!verify_password("correct horse", "wrong-secret", &stored).unwrap());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
