//! Shared helpers for the search algorithms.

use crate::graph::Node;

/// Iterator over the k-element subsets of `0..n`, as sorted index vectors,
/// in lexicographic order. `k == 0` yields a single empty selection.
pub struct Combinations {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Combinations {
            n,
            k,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }
        // Advance the rightmost index that still has room, then reset the
        // tail to consecutive values.
        let mut i = self.k;
        loop {
            if i == 0 {
                self.done = true;
                return None;
            }
            i -= 1;
            if self.indices[i] < i + self.n - self.k {
                break;
            }
        }
        self.indices[i] += 1;
        for j in i + 1..self.k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(self.indices.clone())
    }
}

/// Materialize the subset of `items` named by sorted `indices`.
pub fn select<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

/// Human-readable independence statement, e.g. `X _||_ Y | A, B`.
pub fn independence_fact(x: &Node, y: &Node, z: &[Node]) -> String {
    let mut fact = format!("{} _||_ {}", x, y);
    if !z.is_empty() {
        let names: Vec<String> = z.iter().map(|n| n.name().to_string()).collect();
        fact.push_str(" | ");
        fact.push_str(&names.join(", "));
    }
    fact
}
