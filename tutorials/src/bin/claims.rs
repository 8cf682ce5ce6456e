use stdmerkle_claims::{verify_claim, ClaimRecord, ClaimsBuilder, Manifest, UsersDataInput};
use tracing_subscriber::EnvFilter;

// A points export as the backend writes it.
const EXPORT: &str = r#"{
    "date_generated": 1700000000,
    "users_data": [
        {
            "UserId": "u1", "Email": "a@x.com",
            "UserAddress": "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
            "Reputation": 100, "PrePoints": 50, "Points": 150, "CummulativePoints": 200
        },
        {
            "UserId": "u2", "Email": "b@x.com",
            "UserAddress": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
            "Reputation": 200, "PrePoints": 75, "Points": 225, "CummulativePoints": 300
        },
        {
            "UserId": "u3", "Email": "c@x.com",
            "UserAddress": "0xcccccccccccccccccccccccccccccccccccccccc",
            "Reputation": -5, "PrePoints": 0, "Points": 0, "CummulativePoints": 0
        }
    ]
}"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let input: UsersDataInput = serde_json::from_str(EXPORT).expect("export parses");
    // Build the tree, one claim per user and the manifest.
    let bundle = ClaimsBuilder::default().build(&input).expect("claims build");

    // The manifest is what gets published.
    let manifest_json = serde_json::to_string_pretty(bundle.manifest()).expect("manifest serializes");
    println!("Manifest:\n{}", manifest_json);

    // Each user is handed their own claim record.
    let claim_json = serde_json::to_string_pretty(
        bundle
            .claim("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
            .expect("claim for u1"),
    )
    .expect("claim serializes");
    println!("Claim for u1:\n{}", claim_json);

    // On the other side, the manifest and the claim are all a verifier needs.
    let manifest: Manifest = serde_json::from_str(&manifest_json).expect("manifest parses");
    let mut claim: ClaimRecord = serde_json::from_str(&claim_json).expect("claim parses");
    println!(
        "Does the claim verify? {}",
        verify_claim(&manifest, &claim).expect("well formed claim")
    );

    // Inflating the points breaks the proof.
    claim.points += 1000;
    println!(
        "Does the edited claim verify? {}",
        verify_claim(&manifest, &claim).expect("well formed claim")
    );
}
