// Maximum-weight matching in general (non-bipartite) graphs.
//
// Primal-dual blossom algorithm (Edmonds, with Galil's O(n^3) bookkeeping).
// Weights are integers; vertex duals are stored doubled so every dual
// update stays integral.
//
// Terminology: an "endpoint" `p` identifies one end of edge `p / 2`; the
// vertex is `endpoint[p]` and `p ^ 1` is the other end. Blossoms are
// numbered `n..2n`; a bare vertex is a trivial blossom with its own index.

/// Absent index (no mate, no parent, no label edge).
const NIL: usize = usize::MAX;

/// Compute a maximum-weight matching over `vertex_count` vertices.
///
/// `edges` holds `(u, v, weight)`; self-loops and out-of-range vertices are
/// ignored. With `max_cardinality` the result is the heaviest matching among
/// those of maximum size; otherwise edges of non-positive weight are never
/// worth taking. Returns each vertex's mate.
pub fn max_weight_matching(
    vertex_count: usize,
    edges: &[(usize, usize, i64)],
    max_cardinality: bool,
) -> Vec<Option<usize>> {
    let edges: Vec<(usize, usize, i64)> = edges
        .iter()
        .copied()
        .filter(|&(u, v, _)| u != v && u < vertex_count && v < vertex_count)
        .collect();
    if edges.is_empty() {
        return vec![None; vertex_count];
    }

    let mut matcher = Matcher::new(vertex_count, &edges, max_cardinality);
    matcher.solve();
    matcher.mates()
}

/// Sum of weights of the matched edges. Each matched pair is counted once;
/// for parallel edges the heaviest one between the pair is used.
pub fn matching_weight(mates: &[Option<usize>], edges: &[(usize, usize, i64)]) -> i64 {
    let mut total = 0;
    for (u, mate) in mates.iter().enumerate() {
        let Some(v) = *mate else { continue };
        if u > v {
            continue;
        }
        total += edges
            .iter()
            .filter(|&&(a, b, _)| (a == u && b == v) || (a == v && b == u))
            .map(|&(_, _, w)| w)
            .max()
            .unwrap_or(0);
    }
    total
}

fn at(list: &[usize], j: isize) -> usize {
    let len = list.len() as isize;
    list[j.rem_euclid(len) as usize]
}

struct Matcher<'a> {
    n: usize,
    edges: &'a [(usize, usize, i64)],
    max_cardinality: bool,
    endpoint: Vec<usize>,
    /// Per vertex, the remote endpoints of its incident edges.
    neighbend: Vec<Vec<usize>>,
    /// Remote endpoint of each vertex's matched edge.
    mate: Vec<usize>,
    /// 0 = free, 1 = S (outer), 2 = T (inner); 5 is a scan marker.
    label: Vec<u8>,
    /// Endpoint through which a top-level blossom got its label.
    label_end: Vec<usize>,
    /// Top-level blossom containing each vertex.
    in_blossom: Vec<usize>,
    blossom_parent: Vec<usize>,
    blossom_children: Vec<Vec<usize>>,
    blossom_base: Vec<usize>,
    /// `blossom_endps[b][i]` joins child `i` to child `i + 1`.
    blossom_endps: Vec<Vec<usize>>,
    /// Least-slack edge to a different S-blossom.
    best_edge: Vec<usize>,
    blossom_best_edges: Vec<Option<Vec<usize>>>,
    unused_blossoms: Vec<usize>,
    /// Doubled vertex duals, then blossom duals.
    dual: Vec<i64>,
    allow_edge: Vec<bool>,
    queue: Vec<usize>,
}

impl<'a> Matcher<'a> {
    fn new(n: usize, edges: &'a [(usize, usize, i64)], max_cardinality: bool) -> Self {
        let max_weight = edges.iter().map(|e| e.2).max().unwrap_or(0).max(0);
        let endpoint = (0..2 * edges.len())
            .map(|p| {
                let (u, v, _) = edges[p / 2];
                if p % 2 == 0 {
                    u
                } else {
                    v
                }
            })
            .collect();
        let mut neighbend = vec![Vec::new(); n];
        for (k, &(u, v, _)) in edges.iter().enumerate() {
            neighbend[u].push(2 * k + 1);
            neighbend[v].push(2 * k);
        }

        let mut dual = vec![max_weight; n];
        dual.extend(std::iter::repeat(0).take(n));
        let mut blossom_base: Vec<usize> = (0..n).collect();
        blossom_base.extend(std::iter::repeat(NIL).take(n));

        Matcher {
            n,
            edges,
            max_cardinality,
            endpoint,
            neighbend,
            mate: vec![NIL; n],
            label: vec![0; 2 * n],
            label_end: vec![NIL; 2 * n],
            in_blossom: (0..n).collect(),
            blossom_parent: vec![NIL; 2 * n],
            blossom_children: vec![Vec::new(); 2 * n],
            blossom_base,
            blossom_endps: vec![Vec::new(); 2 * n],
            best_edge: vec![NIL; 2 * n],
            blossom_best_edges: vec![None; 2 * n],
            unused_blossoms: (n..2 * n).collect(),
            dual,
            allow_edge: vec![false; edges.len()],
            queue: Vec::new(),
        }
    }

    fn mates(&self) -> Vec<Option<usize>> {
        self.mate
            .iter()
            .map(|&p| if p == NIL { None } else { Some(self.endpoint[p]) })
            .collect()
    }

    fn slack(&self, k: usize) -> i64 {
        let (u, v, w) = self.edges[k];
        self.dual[u] + self.dual[v] - 2 * w
    }

    fn blossom_leaves(&self, b: usize) -> Vec<usize> {
        let mut leaves = Vec::new();
        self.collect_leaves(b, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, b: usize, out: &mut Vec<usize>) {
        if b < self.n {
            out.push(b);
        } else {
            for &child in &self.blossom_children[b] {
                self.collect_leaves(child, out);
            }
        }
    }

    /// Label the top-level blossom containing `w` with `t`, reached through
    /// endpoint `p`. A T-blossom's mate is labelled S in turn.
    fn assign_label(&mut self, w: usize, t: u8, p: usize) {
        let b = self.in_blossom[w];
        self.label[w] = t;
        self.label[b] = t;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = NIL;
        self.best_edge[b] = NIL;
        if t == 1 {
            let leaves = self.blossom_leaves(b);
            self.queue.extend(leaves);
        } else if t == 2 {
            let base = self.blossom_base[b];
            let m = self.mate[base];
            if m != NIL {
                self.assign_label(self.endpoint[m], 1, m ^ 1);
            }
        }
    }

    /// Trace back from `v` and `w` to find either a new blossom (its base is
    /// returned) or an augmenting path (`NIL`).
    fn scan_blossom(&mut self, v: usize, w: usize) -> usize {
        let mut path = Vec::new();
        let mut base = NIL;
        let (mut v, mut w) = (v, w);
        while v != NIL {
            let mut b = self.in_blossom[v];
            if self.label[b] & 4 != 0 {
                base = self.blossom_base[b];
                break;
            }
            path.push(b);
            self.label[b] = 5;
            if self.label_end[b] == NIL {
                v = NIL;
            } else {
                v = self.endpoint[self.label_end[b]];
                b = self.in_blossom[v];
                v = self.endpoint[self.label_end[b]];
            }
            if w != NIL {
                std::mem::swap(&mut v, &mut w);
            }
        }
        for b in path {
            self.label[b] = 1;
        }
        base
    }

    /// Build a blossom with the given base through edge `k`.
    fn add_blossom(&mut self, base: usize, k: usize) {
        let (v, w, _) = self.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];
        let Some(b) = self.unused_blossoms.pop() else {
            return;
        };
        self.blossom_base[b] = base;
        self.blossom_parent[b] = NIL;
        self.blossom_parent[bb] = b;

        let mut path = Vec::new();
        let mut endps = Vec::new();
        while bv != bb {
            self.blossom_parent[bv] = b;
            path.push(bv);
            endps.push(self.label_end[bv]);
            bv = self.in_blossom[self.endpoint[self.label_end[bv]]];
        }
        path.push(bb);
        path.reverse();
        endps.reverse();
        endps.push(2 * k);
        while bw != bb {
            self.blossom_parent[bw] = b;
            path.push(bw);
            endps.push(self.label_end[bw] ^ 1);
            bw = self.in_blossom[self.endpoint[self.label_end[bw]]];
        }

        self.label[b] = 1;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = 0;
        self.blossom_children[b] = path.clone();
        self.blossom_endps[b] = endps;

        for leaf in self.blossom_leaves(b) {
            if self.label[self.in_blossom[leaf]] == 2 {
                self.queue.push(leaf);
            }
            self.in_blossom[leaf] = b;
        }

        // Least-slack edge from the new blossom to each neighbouring S-blossom.
        let mut best_edge_to = vec![NIL; 2 * self.n];
        for &child in &path {
            let lists: Vec<Vec<usize>> = match self.blossom_best_edges[child].take() {
                Some(list) => vec![list],
                None => self
                    .blossom_leaves(child)
                    .into_iter()
                    .map(|leaf| self.neighbend[leaf].iter().map(|p| p / 2).collect())
                    .collect(),
            };
            for list in lists {
                for e in list {
                    let (i, j, _) = self.edges[e];
                    let j = if self.in_blossom[j] == b { i } else { j };
                    let bj = self.in_blossom[j];
                    if bj != b
                        && self.label[bj] == 1
                        && (best_edge_to[bj] == NIL || self.slack(e) < self.slack(best_edge_to[bj]))
                    {
                        best_edge_to[bj] = e;
                    }
                }
            }
            self.best_edge[child] = NIL;
        }

        let best: Vec<usize> = best_edge_to.into_iter().filter(|&e| e != NIL).collect();
        self.best_edge[b] = NIL;
        for &e in &best {
            if self.best_edge[b] == NIL || self.slack(e) < self.slack(self.best_edge[b]) {
                self.best_edge[b] = e;
            }
        }
        self.blossom_best_edges[b] = Some(best);
    }

    /// Dissolve blossom `b`. Mid-stage expansion of a T-blossom relabels the
    /// children along the even path through it.
    fn expand_blossom(&mut self, b: usize, end_stage: bool) {
        let children = self.blossom_children[b].clone();
        let endps = self.blossom_endps[b].clone();

        for &s in &children {
            self.blossom_parent[s] = NIL;
            if s < self.n {
                self.in_blossom[s] = s;
            } else if end_stage && self.dual[s] == 0 {
                self.expand_blossom(s, end_stage);
            } else {
                for leaf in self.blossom_leaves(s) {
                    self.in_blossom[leaf] = s;
                }
            }
        }

        if !end_stage && self.label[b] == 2 {
            let entry_child = self.in_blossom[self.endpoint[self.label_end[b] ^ 1]];
            let mut j = children
                .iter()
                .position(|&c| c == entry_child)
                .unwrap_or(0) as isize;
            let (step, trick): (isize, usize) = if j & 1 != 0 {
                j -= children.len() as isize;
                (1, 0)
            } else {
                (-1, 1)
            };

            let mut p = self.label_end[b];
            while j != 0 {
                let ep = at(&endps, j - trick as isize);
                self.label[self.endpoint[p ^ 1]] = 0;
                self.label[self.endpoint[ep ^ trick ^ 1]] = 0;
                self.assign_label(self.endpoint[p ^ 1], 2, p);
                self.allow_edge[ep / 2] = true;
                j += step;
                p = at(&endps, j - trick as isize) ^ trick;
                self.allow_edge[p / 2] = true;
                j += step;
            }

            let bv = at(&children, j);
            let reached = self.endpoint[p ^ 1];
            self.label[reached] = 2;
            self.label[bv] = 2;
            self.label_end[reached] = p;
            self.label_end[bv] = p;
            self.best_edge[bv] = NIL;

            j += step;
            while at(&children, j) != entry_child {
                let bv = at(&children, j);
                if self.label[bv] == 1 {
                    j += step;
                    continue;
                }
                let labelled = self
                    .blossom_leaves(bv)
                    .into_iter()
                    .find(|&leaf| self.label[leaf] != 0);
                if let Some(v) = labelled {
                    self.label[v] = 0;
                    self.label[self.endpoint[self.mate[self.blossom_base[bv]]]] = 0;
                    self.assign_label(v, 2, self.label_end[v]);
                }
                j += step;
            }
        }

        self.label[b] = 0;
        self.label_end[b] = NIL;
        self.blossom_children[b] = Vec::new();
        self.blossom_endps[b] = Vec::new();
        self.blossom_base[b] = NIL;
        self.blossom_best_edges[b] = None;
        self.best_edge[b] = NIL;
        self.unused_blossoms.push(b);
    }

    /// Flip the matched/unmatched edges on the path from `v` to the base of
    /// blossom `b`, making `v` the new base.
    fn augment_blossom(&mut self, b: usize, v: usize) {
        let mut t = v;
        while self.blossom_parent[t] != b {
            t = self.blossom_parent[t];
        }
        if t >= self.n {
            self.augment_blossom(t, v);
        }

        let children = self.blossom_children[b].clone();
        let endps = self.blossom_endps[b].clone();
        let i = children.iter().position(|&c| c == t).unwrap_or(0);
        let mut j = i as isize;
        let (step, trick): (isize, usize) = if i & 1 != 0 {
            j -= children.len() as isize;
            (1, 0)
        } else {
            (-1, 1)
        };

        while j != 0 {
            j += step;
            let t = at(&children, j);
            let p = at(&endps, j - trick as isize) ^ trick;
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p]);
            }
            j += step;
            let t = at(&children, j);
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p ^ 1]);
            }
            self.mate[self.endpoint[p]] = p ^ 1;
            self.mate[self.endpoint[p ^ 1]] = p;
        }

        self.blossom_children[b].rotate_left(i);
        self.blossom_endps[b].rotate_left(i);
        self.blossom_base[b] = self.blossom_base[self.blossom_children[b][0]];
    }

    /// Augment along the path through edge `k` between two S-vertices.
    fn augment_matching(&mut self, k: usize) {
        let (v, w, _) = self.edges[k];
        for (mut s, mut p) in [(v, 2 * k + 1), (w, 2 * k)] {
            loop {
                let bs = self.in_blossom[s];
                if bs >= self.n {
                    self.augment_blossom(bs, s);
                }
                self.mate[s] = p;
                if self.label_end[bs] == NIL {
                    break;
                }
                let t = self.endpoint[self.label_end[bs]];
                let bt = self.in_blossom[t];
                s = self.endpoint[self.label_end[bt]];
                let j = self.endpoint[self.label_end[bt] ^ 1];
                if bt >= self.n {
                    self.augment_blossom(bt, j);
                }
                self.mate[j] = self.label_end[bt];
                p = self.label_end[bt] ^ 1;
            }
        }
    }

    fn solve(&mut self) {
        let n = self.n;

        for _stage in 0..n {
            self.label.fill(0);
            self.best_edge.fill(NIL);
            for b in n..2 * n {
                self.blossom_best_edges[b] = None;
            }
            self.allow_edge.fill(false);
            self.queue.clear();

            for v in 0..n {
                if self.mate[v] == NIL && self.label[self.in_blossom[v]] == 0 {
                    self.assign_label(v, 1, NIL);
                }
            }

            let mut augmented = false;
            loop {
                while !augmented {
                    let Some(v) = self.queue.pop() else { break };
                    for idx in 0..self.neighbend[v].len() {
                        let p = self.neighbend[v][idx];
                        let k = p / 2;
                        let w = self.endpoint[p];
                        if self.in_blossom[v] == self.in_blossom[w] {
                            continue;
                        }
                        let mut kslack = 0;
                        if !self.allow_edge[k] {
                            kslack = self.slack(k);
                            if kslack <= 0 {
                                self.allow_edge[k] = true;
                            }
                        }
                        if self.allow_edge[k] {
                            if self.label[self.in_blossom[w]] == 0 {
                                self.assign_label(w, 2, p ^ 1);
                            } else if self.label[self.in_blossom[w]] == 1 {
                                let base = self.scan_blossom(v, w);
                                if base != NIL {
                                    self.add_blossom(base, k);
                                } else {
                                    self.augment_matching(k);
                                    augmented = true;
                                    break;
                                }
                            } else if self.label[w] == 0 {
                                self.label[w] = 2;
                                self.label_end[w] = p ^ 1;
                            }
                        } else if self.label[self.in_blossom[w]] == 1 {
                            let b = self.in_blossom[v];
                            if self.best_edge[b] == NIL || kslack < self.slack(self.best_edge[b]) {
                                self.best_edge[b] = k;
                            }
                        } else if self.label[w] == 0
                            && (self.best_edge[w] == NIL || kslack < self.slack(self.best_edge[w]))
                        {
                            self.best_edge[w] = k;
                        }
                    }
                }
                if augmented {
                    break;
                }

                // No augmenting path under the current duals: pick the
                // largest dual change that keeps every slack non-negative.
                let mut delta_type = 0u8;
                let mut delta = 0i64;
                let mut delta_edge = NIL;
                let mut delta_blossom = NIL;

                if !self.max_cardinality {
                    delta_type = 1;
                    delta = self.dual[..n].iter().copied().min().unwrap_or(0);
                }
                for v in 0..n {
                    if self.label[self.in_blossom[v]] == 0 && self.best_edge[v] != NIL {
                        let d = self.slack(self.best_edge[v]);
                        if delta_type == 0 || d < delta {
                            delta = d;
                            delta_type = 2;
                            delta_edge = self.best_edge[v];
                        }
                    }
                }
                for b in 0..2 * n {
                    if self.blossom_parent[b] == NIL
                        && self.label[b] == 1
                        && self.best_edge[b] != NIL
                    {
                        let d = self.slack(self.best_edge[b]) / 2;
                        if delta_type == 0 || d < delta {
                            delta = d;
                            delta_type = 3;
                            delta_edge = self.best_edge[b];
                        }
                    }
                }
                for b in n..2 * n {
                    if self.blossom_base[b] != NIL
                        && self.blossom_parent[b] == NIL
                        && self.label[b] == 2
                        && (delta_type == 0 || self.dual[b] < delta)
                    {
                        delta = self.dual[b];
                        delta_type = 4;
                        delta_blossom = b;
                    }
                }
                if delta_type == 0 {
                    // Maximum cardinality reached; finish with a final dual
                    // adjustment to reach optimality.
                    delta_type = 1;
                    delta = self.dual[..n].iter().copied().min().unwrap_or(0).max(0);
                }

                for v in 0..n {
                    match self.label[self.in_blossom[v]] {
                        1 => self.dual[v] -= delta,
                        2 => self.dual[v] += delta,
                        _ => {}
                    }
                }
                for b in n..2 * n {
                    if self.blossom_base[b] != NIL && self.blossom_parent[b] == NIL {
                        match self.label[b] {
                            1 => self.dual[b] += delta,
                            2 => self.dual[b] -= delta,
                            _ => {}
                        }
                    }
                }

                match delta_type {
                    2 => {
                        self.allow_edge[delta_edge] = true;
                        let (i, j, _) = self.edges[delta_edge];
                        let s = if self.label[self.in_blossom[i]] == 0 { j } else { i };
                        self.queue.push(s);
                    }
                    3 => {
                        self.allow_edge[delta_edge] = true;
                        let (i, _, _) = self.edges[delta_edge];
                        self.queue.push(i);
                    }
                    4 => self.expand_blossom(delta_blossom, false),
                    _ => break,
                }
            }

            if !augmented {
                break;
            }

            for b in n..2 * n {
                if self.blossom_parent[b] == NIL
                    && self.blossom_base[b] != NIL
                    && self.label[b] == 1
                    && self.dual[b] == 0
                {
                    self.expand_blossom(b, true);
                }
            }
        }
    }
}
