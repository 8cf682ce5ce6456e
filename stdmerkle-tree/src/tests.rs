use assert_matches::assert_matches;
use proptest::prelude::*;
use stdmerkle_abi::{Address, EncodingErrorKind, U256};

use super::*;
use crate::test_utils::*;

const LEAF_0: &str = "0xe32e5f12a2329b808a40e0601ad9e60843dff7e68c8291837b9c44c987b5aea4";
const LEAF_1: &str = "0x01afd5ba3668edb782d9429a7f5ce76d6d49083420f32ab3e4fc559461419482";
const LEAF_2: &str = "0x27cb73ba113eb174c7ce3589322ceefc06e11e1b672a4ee9339fb6bc9169a9a6";
const LEAF_3: &str = "0x2f1bc2ad0df0d60d9700aadf339ffa4b48f8f46afa981011632a6edaf7972098";
const LEAF_4: &str = "0xba8939e83eaaac7ab5e55a2a8a1a65150841bf68b9dc043103aa1d5d7bc5c258";
const NODE_34: &str = "0x9d7f8a436c80b860c15fa126fb224acc8f70663f3a7c1127454e4f4df665b81d";
const NODE_12: &str = "0x4905d1e4afcb4c77d606490290aacf65b132c4490f05402ce0bf19260fb4f9ef";
const HEAP_5_ROOT: &str = "0xddbad9d1313aa5d16da5f980c5682cc904a9d3a788503d1712123d95677eb122";
const LEVELS_5_ROOT: &str = "0x59b1697aca093f2f2e356c2208901abca89ae7cbcba9b5884e8fa1b578c33cde";

fn hashes(hexes: &[&str]) -> Vec<Hash> {
    hexes.iter().map(|h| hash(h)).collect()
}

fn five_leaf_tree(layout: TreeLayout) -> StandardMerkleTree {
    StandardMerkleTree::of_with_options(
        address_amount_schema(),
        address_amount_leaves(5),
        TreeOptions::with_layout(layout),
    )
    .expect("five leaves should build")
}

// ── Hashing ──────────────────────────────────────────────────────────

#[test]
fn test_keccak_empty_input() {
    assert_eq!(
        to_hex(&Keccak256::digest(b"")),
        "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
    );
}

#[test]
fn test_combine_is_symmetric() {
    let a = hash(LEAF_0);
    let b = hash(LEAF_1);
    assert_eq!(combine::<Keccak256>(&a, &b), combine::<Keccak256>(&b, &a));
    assert_eq!(combine::<Blake3>(&a, &b), combine::<Blake3>(&b, &a));
    // smaller digest goes first
    assert_eq!(combine::<Keccak256>(&a, &b), Keccak256::digest_pair(&b, &a));
}

#[test]
fn test_leaf_digests() {
    let schema = address_amount_schema();
    let expected = hashes(&[LEAF_0, LEAF_1, LEAF_2, LEAF_3, LEAF_4]);
    for (values, expected) in address_amount_leaves(5).iter().zip(expected) {
        let digest = hash_leaf::<Keccak256>(&schema, values).expect("leaf should encode");
        assert_eq!(digest, expected);
    }
}

#[test]
fn test_parse_hash_rejects_bad_input() {
    assert_matches!(parse_hash("0x1234"), Err(MerkleTreeError::ProofFormat(_)));
    assert_matches!(parse_hash("0xzz"), Err(MerkleTreeError::ProofFormat(_)));
    // prefix is optional
    assert_eq!(parse_hash(&LEAF_0[2..]).expect("bare hex"), hash(LEAF_0));
}

// ── Building ─────────────────────────────────────────────────────────

#[test]
fn test_published_two_leaf_root() {
    let schema = address_amount_schema();
    let tree = StandardMerkleTree::of(schema, vec![
        vec![
            LeafValue::Address(Address::repeat_byte(0x11)),
            LeafValue::from(5_000_000_000_000_000_000u64),
        ],
        vec![
            LeafValue::Address(Address::repeat_byte(0x22)),
            LeafValue::from(2_500_000_000_000_000_000u64),
        ],
    ])
    .expect("tree should build");
    assert_eq!(
        tree.root_hex(),
        "0xd4dee0beab2d53f2cc83e567171bd2820e49898130a22622b10ead383e90bd77"
    );
}

#[test]
fn test_user_records_roots() {
    let users = three_users();
    let tree = StandardMerkleTree::of(user_schema(), users[..2].to_vec()).expect("two users");
    assert_eq!(
        tree.leaf_hash(0).expect("leaf 0"),
        hash("0x1405736ff5b9c6984bc3bc3a22eebe276f52a32f8b60408d0e28ffa1739449a5")
    );
    assert_eq!(
        tree.leaf_hash(1).expect("leaf 1"),
        hash("0xe6a81b7a4b7aa5e9a864beadc10e0a648f166c19c255e511accca0cf8a0fb92e")
    );
    assert_eq!(
        tree.root_hex(),
        "0xd4d8166d0858a132e596d5433b1244fcb07c446e659597df8bd7be5f2b9f9c76"
    );

    let three_root = "0x1d98a9620c3c7619f9005dad8e6417ced6c64c2a4ffb9152ef23351312b8d86d";
    for layout in [TreeLayout::Heap, TreeLayout::Levels] {
        let tree = StandardMerkleTree::of_with_options(
            user_schema(),
            users.clone(),
            TreeOptions::with_layout(layout),
        )
        .expect("three users");
        assert_eq!(tree.root_hex(), three_root, "layout {layout}");
    }
}

#[test]
fn test_heap_layout_five_leaves() {
    let tree = five_leaf_tree(TreeLayout::Heap);
    assert_eq!(tree.root(), hash(HEAP_5_ROOT));
    assert_eq!(tree.leaf_count(), 5);
    assert_eq!(tree.layout(), TreeLayout::Heap);

    let node_120 = "0xdca8b0330195b17a516441c1b2e33e28f6a5e4fff0618e33818bc61d74a15384";
    let expected = [
        hashes(&[NODE_12, NODE_34]),
        hashes(&[LEAF_2, LEAF_0, NODE_34]),
        hashes(&[LEAF_1, LEAF_0, NODE_34]),
        hashes(&[LEAF_4, node_120]),
        hashes(&[LEAF_3, node_120]),
    ];
    for (index, siblings) in expected.into_iter().enumerate() {
        let proof = tree.proof(index).expect("index in range");
        assert_eq!(proof.siblings(), siblings.as_slice(), "leaf {index}");
        assert!(tree.verify(index, &proof).expect("index in range"));
    }
}

#[test]
fn test_levels_layout_five_leaves() {
    let tree = five_leaf_tree(TreeLayout::Levels);
    assert_eq!(tree.root(), hash(LEVELS_5_ROOT));

    let expected = [
        // sorted last, promoted twice
        hashes(&["0x0e3c59a5252cc8fbc1950c594068895de2e3c653a9a5b894c3456711e2c50868"]),
        hashes(&[LEAF_2, NODE_34, LEAF_0]),
        hashes(&[LEAF_1, NODE_34, LEAF_0]),
        hashes(&[LEAF_4, NODE_12, LEAF_0]),
        hashes(&[LEAF_3, NODE_12, LEAF_0]),
    ];
    for (index, siblings) in expected.into_iter().enumerate() {
        let proof = tree.proof(index).expect("index in range");
        assert_eq!(proof.siblings(), siblings.as_slice(), "leaf {index}");
        assert!(tree.verify(index, &proof).expect("index in range"));
    }
}

#[test]
fn test_single_leaf_tree() {
    let tree = StandardMerkleTree::of(address_amount_schema(), address_amount_leaves(1))
        .expect("one leaf");
    assert_eq!(tree.root(), hash(LEAF_0));
    let proof = tree.proof(0).expect("index 0");
    assert!(proof.is_empty());
    let values = tree.value(0).expect("index 0");
    assert!(verify(tree.schema(), values, proof.siblings(), &tree.root()).expect("well formed"));
}

#[test]
fn test_empty_tree_is_rejected() {
    for layout in [TreeLayout::Heap, TreeLayout::Levels] {
        assert_matches!(
            StandardMerkleTree::of_with_options(
                address_amount_schema(),
                Vec::new(),
                TreeOptions::with_layout(layout)
            ),
            Err(MerkleTreeError::EmptyTree)
        );
    }
}

#[test]
fn test_duplicate_leaves_are_rejected() {
    let mut leaves = address_amount_leaves(3);
    leaves.push(leaves[1].clone());
    assert_matches!(
        StandardMerkleTree::of(address_amount_schema(), leaves),
        Err(MerkleTreeError::DuplicateLeaf { first: 1, second: 3 })
    );
}

#[test]
fn test_encoding_error_names_leaf_and_field() {
    let mut leaves = address_amount_leaves(3);
    leaves[2][0] = LeafValue::from(7u8);
    let err = StandardMerkleTree::of(address_amount_schema(), leaves).expect_err("bad leaf");
    assert_matches!(
        &err,
        MerkleTreeError::LeafEncoding { leaf: Some(2), source }
            if source.field == 0 && matches!(source.kind, EncodingErrorKind::TypeMismatch { .. })
    );
    assert!(err.to_string().starts_with("leaf 2: leaf field 0:"));

    let mut leaves = address_amount_leaves(2);
    leaves[1].pop();
    assert_matches!(
        StandardMerkleTree::of(address_amount_schema(), leaves),
        Err(MerkleTreeError::LeafEncoding { leaf: Some(1), .. })
    );
}

#[test]
fn test_index_out_of_range() {
    let tree = five_leaf_tree(TreeLayout::Heap);
    assert_matches!(
        tree.proof(5),
        Err(MerkleTreeError::IndexOutOfRange { index: 5, leaf_count: 5 })
    );
    assert_matches!(tree.leaf_hash(9), Err(MerkleTreeError::IndexOutOfRange { .. }));
    assert_matches!(tree.value(5), Err(MerkleTreeError::IndexOutOfRange { .. }));
}

#[test]
fn test_leaf_lookup() {
    let tree = five_leaf_tree(TreeLayout::Levels);
    for (index, values) in address_amount_leaves(5).iter().enumerate() {
        assert_eq!(tree.leaf_lookup(values), Some(index));
    }
    let stranger = vec![
        LeafValue::Address(Address::repeat_byte(9)),
        LeafValue::from(900u64),
    ];
    assert_eq!(tree.leaf_lookup(&stranger), None);
    assert_eq!(tree.leaf_lookup(&[LeafValue::Bool(true)]), None);
}

#[test]
fn test_entries_keep_input_order() {
    let leaves = address_amount_leaves(5);
    let tree = StandardMerkleTree::of(address_amount_schema(), leaves.clone()).expect("builds");
    let entries: Vec<_> = tree.entries().map(|(i, v)| (i, v.to_vec())).collect();
    let expected: Vec<_> = leaves.into_iter().enumerate().collect();
    assert_eq!(entries, expected);
}

#[test]
fn test_parallel_threshold_does_not_change_root() {
    let leaves = numbered_leaves(300);
    for layout in [TreeLayout::Heap, TreeLayout::Levels] {
        let eager = TreeOptions {
            layout,
            parallel_threshold: 1,
        };
        let never = TreeOptions {
            layout,
            parallel_threshold: usize::MAX,
        };
        let a = StandardMerkleTree::of_with_options(address_amount_schema(), leaves.clone(), eager)
            .expect("builds");
        let b = StandardMerkleTree::of_with_options(address_amount_schema(), leaves.clone(), never)
            .expect("builds");
        assert_eq!(a.root(), b.root());
        assert_eq!(a.proof(123).expect("in range"), b.proof(123).expect("in range"));
    }
}

#[test]
fn test_validate_accepts_built_trees() {
    for n in [1, 2, 3, 7, 16, 33] {
        for layout in [TreeLayout::Heap, TreeLayout::Levels] {
            let tree = StandardMerkleTree::of_with_options(
                address_amount_schema(),
                numbered_leaves(n),
                TreeOptions::with_layout(layout),
            )
            .expect("builds");
            tree.validate().expect("freshly built tree is consistent");
        }
    }
}

#[test]
fn test_tree_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StandardMerkleTree>();
    assert_send_sync::<StandardMerkleTree<Blake3>>();
}

// ── Proofs and stateless verification ────────────────────────────────

#[test]
fn test_every_proof_verifies_statelessly() {
    let schema = address_amount_schema();
    for n in 1..=40 {
        let leaves = numbered_leaves(n);
        for layout in [TreeLayout::Heap, TreeLayout::Levels] {
            let tree = StandardMerkleTree::of_with_options(
                schema.clone(),
                leaves.clone(),
                TreeOptions::with_layout(layout),
            )
            .expect("builds");
            let root = tree.root();
            for (index, values) in leaves.iter().enumerate() {
                let proof = tree.proof(index).expect("in range");
                assert!(proof.len() <= max_proof_len(n), "n={n} layout={layout}");
                if n.is_power_of_two() {
                    assert_eq!(proof.len(), max_proof_len(n));
                }
                let hex = proof.to_hex_strings();
                let wire = Proof::from_hex_strings(&hex).expect("hex round trip");
                assert!(
                    verify(&schema, values, wire.siblings(), &root).expect("well formed"),
                    "n={n} layout={layout} index={index}"
                );
            }
        }
    }
}

#[test]
fn test_verify_rejects_tampering() {
    let tree = five_leaf_tree(TreeLayout::Heap);
    let schema = tree.schema().clone();
    let values = tree.value(3).expect("in range").to_vec();
    let proof = tree.proof(3).expect("in range");
    let root = tree.root();
    assert!(verify(&schema, &values, proof.siblings(), &root).expect("well formed"));

    let mut bad_root = root;
    bad_root[31] ^= 1;
    assert!(!verify(&schema, &values, proof.siblings(), &bad_root).expect("well formed"));

    let mut bad_proof = proof.clone().into_siblings();
    bad_proof[0][0] ^= 0x80;
    assert!(!verify(&schema, &values, &bad_proof, &root).expect("well formed"));

    let mut bad_values = values.clone();
    bad_values[1] = LeafValue::from(401u64);
    assert!(!verify(&schema, &bad_values, proof.siblings(), &root).expect("well formed"));

    // another leaf's proof
    let other = tree.proof(0).expect("in range");
    assert!(!verify(&schema, &values, other.siblings(), &root).expect("well formed"));
}

#[test]
fn test_verify_reports_malformed_input() {
    let tree = five_leaf_tree(TreeLayout::Heap);
    let schema = tree.schema().clone();
    let values = tree.value(0).expect("in range").to_vec();
    let proof = tree.proof(0).expect("in range").to_hex_strings();
    let siblings: Vec<Vec<u8>> = proof
        .iter()
        .map(|h| hex::decode(&h[2..]).expect("hex"))
        .collect();

    assert_matches!(
        verify(&schema, &values, &siblings, &tree.root()[..31]),
        Err(MerkleTreeError::ProofFormat(_))
    );

    let mut short = siblings.clone();
    short[1].pop();
    assert_matches!(
        verify(&schema, &values, &short, &tree.root()),
        Err(MerkleTreeError::ProofFormat(msg)) if msg.starts_with("sibling 1")
    );

    assert_matches!(
        verify(&schema, &values[..1], &siblings, &tree.root()),
        Err(MerkleTreeError::LeafEncoding { leaf: None, .. })
    );
    assert!(verify(&schema, &values, &siblings, &tree.root()).expect("well formed"));
}

#[test]
fn test_proof_verify_method_and_helpers() {
    let tree = five_leaf_tree(TreeLayout::Levels);
    let proof = tree.proof(2).expect("in range");
    let values = tree.value(2).expect("in range");
    assert!(
        proof
            .verify::<Keccak256>(tree.schema(), values, &tree.root())
            .expect("well formed")
    );
    let leaf = tree.leaf_hash(2).expect("in range");
    assert_eq!(process_proof::<Keccak256>(&leaf, proof.siblings()), tree.root());
    assert!(verify_leaf_hash::<Keccak256>(&leaf, &proof, &tree.root()));
    assert!(!verify_leaf_hash::<Keccak256>(&hash(LEAF_3), &proof, &tree.root()));
}

#[test]
fn test_blake3_tree() {
    let schema = address_amount_schema();
    let leaves = address_amount_leaves(5);
    let tree = StandardMerkleTree::<Blake3>::build(schema.clone(), leaves.clone(), TreeOptions::default())
        .expect("builds");
    assert_ne!(tree.root(), hash(HEAP_5_ROOT));
    for (index, values) in leaves.iter().enumerate() {
        let proof = tree.proof(index).expect("in range");
        assert!(verify_with::<Blake3, _>(&schema, values, proof.siblings(), &tree.root()).expect("ok"));
        assert!(!verify(&schema, values, proof.siblings(), &tree.root()).expect("ok"));
    }
}

proptest! {
    #[test]
    fn test_root_ignores_input_order(
        order in (1usize..48).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle()),
        levels in any::<bool>(),
    ) {
        let layout = if levels { TreeLayout::Levels } else { TreeLayout::Heap };
        let leaves = numbered_leaves(order.len());
        let shuffled: Vec<_> = order.iter().map(|&i| leaves[i].clone()).collect();
        let options = TreeOptions::with_layout(layout);
        let a = StandardMerkleTree::of_with_options(address_amount_schema(), leaves, options)
            .expect("builds");
        let b = StandardMerkleTree::of_with_options(address_amount_schema(), shuffled, options)
            .expect("builds");
        prop_assert_eq!(a.root(), b.root());
        // proofs follow the leaf, not its input index
        for (new_index, &old_index) in order.iter().enumerate() {
            prop_assert_eq!(b.proof(new_index).expect("in range"), a.proof(old_index).expect("in range"));
        }
    }

    #[test]
    fn test_flipped_bit_fails_verification(
        n in 2usize..40,
        pick in any::<prop::sample::Index>(),
        byte in 0usize..32,
        bit in 0u8..8,
        target in 0u8..3,
    ) {
        let schema = address_amount_schema();
        let leaves = numbered_leaves(n);
        let tree = StandardMerkleTree::of(schema.clone(), leaves.clone()).expect("builds");
        let index = pick.index(n);
        let mut siblings = tree.proof(index).expect("in range").into_siblings();
        let mut root = tree.root();
        let mut values = leaves[index].clone();
        match target {
            0 => root[byte] ^= 1 << bit,
            1 => {
                let k = byte % siblings.len();
                siblings[k][byte] ^= 1 << bit
            }
            _ => {
                let amount = match &values[1] {
                    LeafValue::Uint(v) => *v,
                    other => panic!("unexpected value {other:?}"),
                };
                values[1] = LeafValue::Uint(amount ^ (U256::from(1u8) << (byte * 8 + bit as usize)));
            }
        }
        prop_assert!(!verify(&schema, &values, &siblings, &root).expect("well formed"));
    }
}

// ── Dumps ────────────────────────────────────────────────────────────

#[test]
fn test_dump_round_trip() {
    for layout in [TreeLayout::Heap, TreeLayout::Levels] {
        let tree = StandardMerkleTree::of_with_options(
            user_schema(),
            three_users(),
            TreeOptions::with_layout(layout),
        )
        .expect("builds");
        let dump = tree.dump();
        assert_eq!(dump.format, DUMP_FORMAT);
        assert_eq!(dump.hasher, "keccak256");
        assert_eq!(dump.layout, layout);
        assert_eq!(dump.values[2].value[3], "-5");
        assert_eq!(dump.values[2].value[2], "0xcccccccccccccccccccccccccccccccccccccccc");

        let loaded = StandardMerkleTree::load(&dump).expect("dump loads");
        assert_eq!(loaded.root(), tree.root());
        assert_eq!(loaded.layout(), layout);
        for index in 0..3 {
            assert_eq!(loaded.proof(index).expect("ok"), tree.proof(index).expect("ok"));
            assert_eq!(loaded.value(index).expect("ok"), tree.value(index).expect("ok"));
        }
        loaded.validate().expect("loaded tree is consistent");

        let bytes = dump.encode_to_vec().expect("encodes");
        assert_eq!(TreeDump::decode_from_slice(&bytes).expect("decodes"), dump);
    }
}

#[test]
fn test_dump_bytes_reject_trailing_data() {
    let dump = five_leaf_tree(TreeLayout::Heap).dump();
    let mut bytes = dump.encode_to_vec().expect("encodes");
    bytes.push(0);
    assert_matches!(
        TreeDump::decode_from_slice(&bytes),
        Err(MerkleTreeError::InvalidDump(message)) if message.contains("1 trailing byte")
    );
    bytes.truncate(bytes.len() - 2);
    assert_matches!(
        TreeDump::decode_from_slice(&bytes),
        Err(MerkleTreeError::InvalidDump(_))
    );
}

#[test]
fn test_heap_dump_matches_standard_layout() {
    let tree = five_leaf_tree(TreeLayout::Heap);
    let dump = tree.dump();
    assert_eq!(dump.tree.len(), 9);
    assert_eq!(dump.tree[0], HEAP_5_ROOT);
    // sorted leaves fill the array from the back
    assert_eq!(dump.tree[8], LEAF_1);
    assert_eq!(dump.tree[4], LEAF_0);
    let indices: Vec<_> = dump.values.iter().map(|v| v.tree_index).collect();
    assert_eq!(indices, vec![4, 8, 7, 6, 5]);
}

#[test]
fn test_load_rejects_inconsistent_dumps() {
    let tree = five_leaf_tree(TreeLayout::Heap);
    let good = tree.dump();

    let mut dump = good.clone();
    dump.format = "standard-v2".to_string();
    assert_matches!(StandardMerkleTree::load(&dump), Err(MerkleTreeError::InvalidDump(_)));

    let mut dump = good.clone();
    dump.values[1].value[1] = "201".to_string();
    assert_matches!(StandardMerkleTree::load(&dump), Err(MerkleTreeError::InvalidDump(_)));

    let mut dump = good.clone();
    dump.tree[1] = dump.tree[2].clone();
    assert_matches!(StandardMerkleTree::load(&dump), Err(MerkleTreeError::InvalidDump(_)));

    let mut dump = good.clone();
    dump.tree.pop();
    assert_matches!(StandardMerkleTree::load(&dump), Err(MerkleTreeError::InvalidDump(_)));

    let mut dump = good.clone();
    dump.values[0].tree_index = 0;
    assert_matches!(
        StandardMerkleTree::load(&dump),
        Err(MerkleTreeError::InvalidDump(msg)) if msg.contains("not a leaf")
    );

    let mut dump = good.clone();
    dump.values[0].tree_index = dump.values[1].tree_index;
    assert_matches!(StandardMerkleTree::load(&dump), Err(MerkleTreeError::InvalidDump(_)));

    let mut dump = good.clone();
    dump.layout = TreeLayout::Levels;
    assert_matches!(StandardMerkleTree::load(&dump), Err(MerkleTreeError::InvalidDump(_)));

    assert_matches!(
        StandardMerkleTree::<Blake3>::from_dump(&good),
        Err(MerkleTreeError::InvalidDump(msg)) if msg.contains("keccak256")
    );
    StandardMerkleTree::load(&good).expect("untouched dump still loads");
}

#[cfg(feature = "serde")]
#[test]
fn test_dump_json_round_trip() {
    let tree = five_leaf_tree(TreeLayout::Levels);
    let json = serde_json::to_value(tree.dump()).expect("serializes");
    assert_eq!(json["format"], "standard-v1");
    assert_eq!(json["layout"], "levels");
    assert_eq!(json["leafEncoding"][1], "uint256");
    assert_eq!(json["values"][0]["treeIndex"], 4);
    let dump: TreeDump = serde_json::from_value(json).expect("deserializes");
    assert_eq!(StandardMerkleTree::load(&dump).expect("loads").root(), tree.root());
}

// ── Rendering ────────────────────────────────────────────────────────

#[test]
fn test_render_lists_every_node() {
    let tree = five_leaf_tree(TreeLayout::Heap);
    let drawing = tree.render();
    let lines: Vec<_> = drawing.lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], format!("0) {HEAP_5_ROOT}"));
    assert!(lines[1].starts_with("├─ 1) "));
    assert!(lines.iter().any(|l| l.starts_with("└─ 2) ")));
    assert!(lines[8].starts_with("   └─ 6) "));

    let levels = five_leaf_tree(TreeLayout::Levels).render();
    assert!(levels.starts_with(&format!("10) {LEVELS_5_ROOT}")));
    // promoted nodes repeat their only child
    assert_eq!(levels.lines().count(), 11);
}
