use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &[u8], data: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(data);
    mac
}

pub fn sign_data(secret: &[u8], data: &[u8]) -> String {
    STANDARD.encode(mac_for(secret, data).finalize().into_bytes())
}

pub fn verify_signature(secret: &[u8], data: &[u8], signature_b64: &str) -> bool {
    let Ok(sig_bytes) = STANDARD.decode(signature_b64) else {
        return false;
    };
    mac_for(secret, data).verify_slice(&sig_bytes).is_ok()
}

pub fn sign_url_safe(secret: &[u8], data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(mac_for(secret, data).finalize().into_bytes())
}

pub fn verify_url_safe(secret: &[u8], data: &[u8], signature: &str) -> bool {
    let Ok(sig_bytes) = URL_SAFE_NO_PAD.decode(signature) else {
        return false;
    };
    mac_for(secret, data).verify_slice(&sig_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify() {
        let body = br#"{"event":"alert.created"}"#;
        let sig = sign_data(b"hook-secret", body);
        assert!(verify_signature(b"hook-secret", body, &sig));
        assert!(!verify_signature(b"other-secret", body, &sig));
    }

    #[test]
    fn wrong_signature_rejected() {
        assert!(!verify_signature(b"secret", b"data", "bad-base64!"));
        assert!(!verify_signature(b"secret", b"data", &STANDARD.encode(b"wrong")));
    }

    #[test]
    fn url_safe_signature_has_no_padding() {
        let sig = sign_url_safe(b"key", b"header.payload");
        assert!(!sig.contains('=') && !sig.contains('+') && !sig.contains('/'));
        assert!(verify_url_safe(b"key", b"header.payload", &sig));
        assert!(!verify_url_safe(b"key", b"header.tampered", &sig));
    }
}
