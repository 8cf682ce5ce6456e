use crate::{
    hash::{to_hex, MerkleHasher},
    layout::Nodes,
    tree::StandardMerkleTree,
};

impl<H: MerkleHasher> StandardMerkleTree<H> {
    /// Draw the node structure, one node per line as `index) digest`, where
    /// `index` is the position in the dumped node array.
    pub fn render(&self) -> String {
        render(self.nodes())
    }
}

pub(crate) fn render(nodes: &Nodes) -> String {
    match nodes {
        Nodes::Heap(tree) => draw(
            0usize,
            |k| {
                if 2 * k + 2 < tree.len() {
                    vec![2 * k + 1, 2 * k + 2]
                } else {
                    Vec::new()
                }
            },
            |k| format!("{}) {}", k, to_hex(&tree[k])),
        ),
        Nodes::Levels(levels) => {
            let mut offsets = Vec::with_capacity(levels.len());
            let mut offset = 0;
            for level in levels {
                offsets.push(offset);
                offset += level.len();
            }
            let top = levels.len().saturating_sub(1);
            draw(
                (top, 0usize),
                |(depth, i)| {
                    if depth == 0 {
                        return Vec::new();
                    }
                    (2 * i..2 * i + 2)
                        .filter(|&c| c < levels[depth - 1].len())
                        .map(|c| (depth - 1, c))
                        .collect()
                },
                |(depth, i)| format!("{}) {}", offsets[depth] + i, to_hex(&levels[depth][i])),
            )
        }
    }
}

fn draw<N: Copy>(root: N, children: impl Fn(N) -> Vec<N>, label: impl Fn(N) -> String) -> String {
    let mut lines = Vec::new();
    // `path` holds, per ancestor below the root, whether it was a last child
    let mut stack = vec![(root, Vec::<bool>::new())];
    while let Some((node, path)) = stack.pop() {
        let mut line = String::new();
        if let Some((last, ancestors)) = path.split_last() {
            for &done in ancestors {
                line.push_str(if done { "   " } else { "│  " });
            }
            line.push_str(if *last { "└─ " } else { "├─ " });
        }
        line.push_str(&label(node));
        lines.push(line);

        let kids = children(node);
        let count = kids.len();
        for (i, child) in kids.into_iter().enumerate().rev() {
            let mut child_path = path.clone();
            child_path.push(i + 1 == count);
            stack.push((child, child_path));
        }
    }
    lines.join("\n")
}
