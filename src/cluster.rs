// Consolidates verified similar pairs into duplicate groups.

use std::collections::HashMap;

/// A candidate pair that survived similarity verification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarPair {
    pub a: u32,
    pub b: u32,
    pub similarity: f32,
}

/// Final partition of the corpus: every document is either in exactly one
/// group or listed as unique. `pair_similarities` carries the verified
/// estimates for reporting, keyed by sorted id pairs.
#[derive(Debug, Clone)]
pub struct GroupAssignment {
    pub unique: Vec<String>,
    pub groups: Vec<Vec<String>>,
    pub pair_similarities: HashMap<(String, String), f32>,
}

/// Union-find with path halving and union by rank. The reference grouping
/// never merged two already-formed groups when a later pair bridged them,
/// which under-merges clusters; performing union(a, b) per accepted pair
/// guarantees full transitive closure instead.
pub struct UnionFind {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![0; size],
        }
    }

    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            // path halving: point x at its grandparent as we walk up
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    pub fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        let rank_a = self.rank[root_a as usize];
        let rank_b = self.rank[root_b as usize];
        if rank_a < rank_b {
            self.parent[root_a as usize] = root_b;
        } else if rank_a > rank_b {
            self.parent[root_b as usize] = root_a;
        } else {
            self.parent[root_b as usize] = root_a;
            self.rank[root_a as usize] += 1;
        }
    }

    pub fn same_group(&mut self, a: u32, b: u32) -> bool {
        self.find(a) == self.find(b)
    }
}

/// Build the final partition from verified pairs. `doc_ids` is the full
/// corpus in sorted-id order (indices in pairs refer into it). Pairs are
/// consumed in sorted order so the grouping is reproducible; with union-find
/// the resulting partition is order-independent anyway.
pub fn build_groups(doc_ids: &[String], pairs: &[SimilarPair]) -> GroupAssignment {
    let mut uf = UnionFind::new(doc_ids.len());
    let mut sorted_pairs: Vec<SimilarPair> = pairs.to_vec();
    sorted_pairs.sort_by_key(|p| (p.a, p.b));

    let mut pair_similarities = HashMap::with_capacity(sorted_pairs.len());
    for pair in &sorted_pairs {
        uf.union(pair.a, pair.b);
        let key = (
            doc_ids[pair.a as usize].clone(),
            doc_ids[pair.b as usize].clone(),
        );
        pair_similarities.insert(key, pair.similarity);
    }

    // Group members by root; indices follow sorted doc-id order, so pushing
    // in index order keeps every member list sorted by id.
    let mut members_by_root: HashMap<u32, Vec<u32>> = HashMap::new();
    for idx in 0..doc_ids.len() as u32 {
        members_by_root.entry(uf.find(idx)).or_default().push(idx);
    }

    let mut unique = Vec::new();
    let mut groups = Vec::new();
    for (_, members) in members_by_root {
        if members.len() == 1 {
            unique.push(doc_ids[members[0] as usize].clone());
        } else {
            groups.push(
                members
                    .iter()
                    .map(|&idx| doc_ids[idx as usize].clone())
                    .collect::<Vec<String>>(),
            );
        }
    }
    unique.sort();
    groups.sort();

    GroupAssignment {
        unique,
        groups,
        pair_similarities,
    }
}
