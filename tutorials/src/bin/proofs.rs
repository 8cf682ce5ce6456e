use stdmerkle_abi::LeafSchema;
use stdmerkle_tree::{parse_hash, verify, Proof, StandardMerkleTree, TreeDump};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Describe each leaf with its Solidity types.
    let schema = LeafSchema::parse(["address", "uint256"]).expect("valid schema");
    // Parse the rows as they would come out of a spreadsheet.
    let rows = [
        ["0x1111111111111111111111111111111111111111", "5000000000000000000"],
        ["0x2222222222222222222222222222222222222222", "2500000000000000000"],
        ["0x3333333333333333333333333333333333333333", "0x2a"],
        ["0x4444444444444444444444444444444444444444", "1"],
        ["0x5555555555555555555555555555555555555555", "0"],
    ];
    let tuples = rows
        .iter()
        .map(|row| schema.parse_row(row))
        .collect::<Result<Vec<_>, _>>()
        .expect("rows match the schema");

    // Build the tree. Input order does not change the root.
    let tree = StandardMerkleTree::of(schema.clone(), tuples.clone()).expect("tree builds");
    println!("Root: {}", tree.root_hex());
    println!("{}", tree.render());

    // Prove the third row and ship the proof as hex strings.
    let proof = tree.proof(2).expect("index in range");
    let hex_proof = proof.to_hex_strings();
    println!("Proof for row 2: {:?}", hex_proof);

    // Anyone holding the root, the row and the proof can check it.
    let received = Proof::from_hex_strings(&hex_proof).expect("hex proof parses");
    let root = parse_hash(&tree.root_hex()).expect("hex root parses");
    let valid = verify(&schema, &tuples[2], received.siblings(), &root).expect("well formed proof");
    println!("Does the proof verify? {}", valid);

    // A proof for another row fails for this one.
    let other = tree.proof(3).expect("index in range");
    let valid = verify(&schema, &tuples[2], other.siblings(), &tree.root())
        .expect("well formed proof");
    println!("Does row 3's proof verify row 2? {}", valid);

    // Dump the tree, reload it, and get the same proofs back.
    let json = serde_json::to_string_pretty(&tree.dump()).expect("dump serializes");
    let dump: TreeDump = serde_json::from_str(&json).expect("dump parses");
    let reloaded = StandardMerkleTree::load(&dump).expect("dump loads");
    println!(
        "Does the reloaded tree give the same proof? {}",
        reloaded.proof(2).expect("index in range") == proof
    );
}
