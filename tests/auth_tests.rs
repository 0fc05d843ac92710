//! Token codec and permission table tests

use chrono::Duration;
use sessiongate::auth::{
    Capability, JwtCodec, PermissionTable, Role, TokenCodec, TokenPayload, UnsignedCodec,
};

const NOW: i64 = 1_750_000_000;

fn codecs() -> Vec<(&'static str, Box<dyn TokenCodec>)> {
    vec![
        ("unsigned", Box::new(UnsignedCodec::new())),
        ("jwt", Box::new(JwtCodec::new(b"auth-tests-secret").unwrap())),
    ]
}

fn sample_payloads() -> Vec<TokenPayload> {
    vec![
        TokenPayload::issue("w-1", Role::Worker, NOW, Duration::minutes(15)).unwrap(),
        TokenPayload::issue("seller@example.com", Role::Seller, 0, Duration::seconds(1)).unwrap(),
        TokenPayload::issue("管理者", Role::Admin, NOW, Duration::days(7)).unwrap(),
        TokenPayload::issue("a.b.c", Role::Worker, -100, Duration::seconds(50)).unwrap(),
    ]
}

// ============================================================================
// Codec Tests
// ============================================================================

#[test]
fn test_decode_inverts_encode() {
    for (name, codec) in codecs() {
        for payload in sample_payloads() {
            let token = codec.encode(&payload).expect("Failed to create token");
            assert_eq!(codec.decode(&token), Some(payload.clone()), "codec {}", name);
        }
    }
}

#[test]
fn test_verify_expiry_boundary() {
    for (name, codec) in codecs() {
        let expired = TokenPayload {
            subject: "w-1".to_string(),
            role: Role::Worker,
            issued_at: NOW - 100,
            expires_at: NOW - 1,
        };
        let live = TokenPayload {
            expires_at: NOW + 1,
            ..expired.clone()
        };

        let expired_token = codec.encode(&expired).unwrap();
        let live_token = codec.encode(&live).unwrap();

        assert!(codec.verify(&expired_token, NOW).is_none(), "codec {}", name);
        assert_eq!(codec.verify(&live_token, NOW), Some(live), "codec {}", name);
    }
}

#[test]
fn test_malformed_input_never_decodes() {
    let bytes = [0x9f, 0x00, 0xff, 0x41, 0x2e, 0x2e, 0x7f];
    let random_bytes = String::from_utf8_lossy(&bytes).into_owned();

    for (name, codec) in codecs() {
        let valid = codec.encode(&sample_payloads()[0]).unwrap();
        let mut inputs = vec![
            String::new(),
            " ".to_string(),
            "null".to_string(),
            "invalid.token.here".to_string(),
            "a.b.c.d".to_string(),
            random_bytes.clone(),
            format!("{}.", valid),
            format!(".{}", valid),
        ];
        for cut in [1, 10, valid.len() / 2, valid.len() - 1] {
            inputs.push(valid[..cut].to_string());
        }

        for input in inputs {
            assert_eq!(codec.decode(&input), None, "codec {} accepted {:?}", name, input);
            assert_eq!(codec.verify(&input, NOW), None);
        }
        println!("✓ {} rejects malformed tokens", name);
    }
}

#[test]
fn test_tokens_are_not_interchangeable_between_codecs() {
    let unsigned = UnsignedCodec::new();
    let jwt = JwtCodec::new(b"auth-tests-secret").unwrap();
    let payload = sample_payloads()[0].clone();

    assert!(jwt.decode(&unsigned.encode(&payload).unwrap()).is_none());
    assert!(unsigned.decode(&jwt.encode(&payload).unwrap()).is_none());
}

// ============================================================================
// Permission Table Tests
// ============================================================================

#[test]
fn test_capabilities_total_over_role_names() {
    let table = PermissionTable::standard();
    for name in ["seller", "worker", "admin", "WORKER", "guest", "", "root", "🙂"] {
        // Always a set; only known roles have entries
        let caps = table.capabilities_for_name(name);
        let known = name.parse::<Role>().is_ok();
        assert_eq!(!caps.is_empty(), known, "role {:?}", name);
    }
}

#[test]
fn test_every_role_has_a_home_route() {
    let table = PermissionTable::standard();
    assert!(table.has_capability(Role::Seller, Capability::SellerRoutes));
    assert!(table.has_capability(Role::Worker, Capability::WorkerRoutes));
    assert!(table.has_capability(Role::Admin, Capability::AdminRoutes));
    for role in Role::ALL {
        assert!(table.has_capability(role, Capability::ProfileRoutes));
    }
}

#[test]
fn test_only_admin_reaches_admin_routes() {
    let table = PermissionTable::standard();
    let admin_only = [Capability::AdminRoutes, Capability::ManageUsers, Capability::ManageSettings];
    assert!(table.has_all(Role::Admin, &admin_only));
    assert!(!table.has_any(Role::Seller, &admin_only));
    assert!(!table.has_any(Role::Worker, &admin_only));
}
