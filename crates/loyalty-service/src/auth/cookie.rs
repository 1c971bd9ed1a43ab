//! 签名 Cookie
//!
//! 认证 Cookie 的值为 `base64(login) + "-" + base64(HMAC-SHA256(base64(login), secret))`。
//! 标准 base64 字母表不含 `-`，分隔符不会出现歧义。签名验证是常数时间的。

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 认证 Cookie 名
pub const AUTH_COOKIE_NAME: &str = "whoami";

/// Cookie 有效期：一年
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;

/// Cookie 签名器
#[derive(Clone)]
pub struct CookieSigner {
    secret: String,
    domain: String,
}

impl CookieSigner {
    pub fn new(secret: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            domain: domain.into(),
        }
    }

    /// 生成签名后的 Cookie 值
    pub fn sign(&self, login: &str) -> String {
        let payload = STANDARD.encode(login.as_bytes());
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC 接受任意长度密钥");
        mac.update(payload.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        format!("{payload}-{signature}")
    }

    /// 生成完整的 Set-Cookie 头值
    pub fn build_set_cookie(&self, login: &str) -> String {
        format!(
            "{AUTH_COOKIE_NAME}={}; Max-Age={COOKIE_MAX_AGE_SECS}; Path=/; Domain={}; HttpOnly",
            self.sign(login),
            self.domain
        )
    }

    /// 验证 Cookie 值并取出其中的登录名
    ///
    /// 签名校验失败、编码非法、缺少分隔符都返回 `None`。
    pub fn verify(&self, cookie_value: &str) -> Option<String> {
        let (payload, signature) = cookie_value.split_once('-')?;
        if signature.is_empty() {
            return None;
        }

        let signature = STANDARD.decode(signature).ok()?;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(payload.as_bytes());
        // verify_slice 内部是常数时间比较
        mac.verify_slice(&signature).ok()?;

        let login = STANDARD.decode(payload).ok()?;
        String::from_utf8(login).ok()
    }

    /// 从 Cookie 请求头中找出认证 Cookie 并验证
    pub fn login_from_cookie_header(&self, header: &str) -> Option<String> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == AUTH_COOKIE_NAME)
            .and_then(|(_, value)| self.verify(value))
    }
}
