//! Algorithms module: sorting routines written against [`SortArray`].
//!
//! Every routine only touches the buffer through instrumented operations,
//! sorts it completely unless cancelled, and can be called again on a fresh
//! buffer. Long-running routines poll [`SortArray::cancelled`] once per
//! outer step and may leave a partially sorted buffer behind.

use rand::Rng;

use crate::array::SortArray;

/// Entry point of a visualizable sorting routine.
pub type SortFn = fn(&mut SortArray<'_>);

/// A named sorting routine.
#[derive(Clone, Copy)]
pub struct Algorithm {
    pub name: &'static str,
    pub run: SortFn,
}

impl std::fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Algorithm").field("name", &self.name).finish()
    }
}

/// Every registered routine, in presentation order.
pub const ALGORITHMS: &[Algorithm] = &[
    Algorithm { name: "Selection Sort", run: selection_sort },
    Algorithm { name: "Insertion Sort", run: insertion_sort },
    Algorithm { name: "Bubble Sort", run: bubble_sort },
    Algorithm { name: "Cocktail Shaker Sort", run: cocktail_shaker_sort },
    Algorithm { name: "Quick Sort (LR ptrs)", run: quick_sort_lr },
    Algorithm { name: "Quick Sort (LL ptrs)", run: quick_sort_ll },
    Algorithm { name: "Quick Sort (dual pivot)", run: quick_sort_dual_pivot },
    Algorithm { name: "Merge Sort", run: merge_sort },
    Algorithm { name: "Merge Sort (iterative)", run: merge_sort_iterative },
    Algorithm { name: "Shell Sort", run: shell_sort },
    Algorithm { name: "Heap Sort", run: heap_sort },
    Algorithm { name: "Cycle Sort", run: cycle_sort },
    Algorithm { name: "Radix Sort (MSD)", run: radix_sort_msd },
    Algorithm { name: "Radix Sort (LSD)", run: radix_sort_lsd },
];

/// Looks up a registered routine by name, ignoring ASCII case.
pub fn find(name: &str) -> Option<&'static Algorithm> {
    ALGORITHMS.iter().find(|a| a.name.eq_ignore_ascii_case(name))
}

// *** simple quadratic sorts

pub fn selection_sort(a: &mut SortArray<'_>) {
    let n = a.len();
    for i in 0..n.saturating_sub(1) {
        if a.cancelled() {
            return;
        }
        let mut j_min = i;
        for j in i + 1..n {
            if a.less(j, j_min) {
                j_min = j;
            }
        }
        a.swap(i, j_min);
    }
}

pub fn insertion_sort(a: &mut SortArray<'_>) {
    let n = a.len();
    for i in 1..n {
        if a.cancelled() {
            return;
        }
        let key = a.get(i);
        let mut j = i;
        while j > 0 && a.greater(j - 1, &key) {
            a.swap(j - 1, j);
            j -= 1;
        }
    }
}

pub fn bubble_sort(a: &mut SortArray<'_>) {
    let n = a.len();
    for i in 0..n.saturating_sub(1) {
        if a.cancelled() {
            return;
        }
        for j in 0..n - 1 - i {
            if a.greater(j, j + 1) {
                a.swap(j, j + 1);
            }
        }
    }
}

pub fn cocktail_shaker_sort(a: &mut SortArray<'_>) {
    if a.len() < 2 {
        return;
    }
    let (mut lo, mut hi) = (0, a.len() - 1);
    let mut mov = lo;
    while lo < hi && !a.cancelled() {
        for i in (lo + 1..=hi).rev() {
            if a.greater(i - 1, i) {
                a.swap(i - 1, i);
                mov = i;
            }
        }
        lo = mov;
        for i in lo..hi {
            if a.greater(i, i + 1) {
                a.swap(i, i + 1);
                mov = i;
            }
        }
        hi = mov;
    }
}

// *** quick sorts

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PivotRule {
    First,
    Last,
    Mid,
    Random,
    MedianOfThree,
}

impl PivotRule {
    const ALL: [PivotRule; 5] = [
        PivotRule::First,
        PivotRule::Last,
        PivotRule::Mid,
        PivotRule::Random,
        PivotRule::MedianOfThree,
    ];

    fn random() -> Self {
        Self::ALL[rand::rng().random_range(0..Self::ALL.len())]
    }

    /// Picks a pivot index in `lo..hi` (exclusive upper bound).
    fn select(self, a: &mut SortArray<'_>, lo: usize, hi: usize) -> usize {
        match self {
            PivotRule::First => lo,
            PivotRule::Last => hi - 1,
            PivotRule::Mid => (lo + hi) / 2,
            PivotRule::Random => rand::rng().random_range(lo..hi),
            PivotRule::MedianOfThree => {
                let (mid, last) = ((lo + hi) / 2, hi - 1);
                if a.equal(lo, mid) {
                    return lo;
                }
                if a.equal(lo, last) || a.equal(mid, last) {
                    return last;
                }
                if a.less(lo, mid) {
                    if a.less(mid, last) {
                        mid
                    } else if a.less(lo, last) {
                        last
                    } else {
                        lo
                    }
                } else if a.greater(mid, last) {
                    mid
                } else if a.less(lo, last) {
                    lo
                } else {
                    last
                }
            }
        }
    }
}

/// Hoare partitioning with left and right pointers.
pub fn quick_sort_lr(a: &mut SortArray<'_>) {
    if a.len() < 2 {
        return;
    }
    let rule = PivotRule::random();
    quick_sort_lr_range(a, rule, 0, a.len() - 1);
}

fn quick_sort_lr_range(a: &mut SortArray<'_>, rule: PivotRule, lo: usize, hi: usize) {
    if a.cancelled() {
        return;
    }
    let mut p = rule.select(a, lo, hi + 1);
    let (mut i, mut j) = (lo as isize, hi as isize);

    while i <= j && !a.cancelled() {
        while a.less(i as usize, p) {
            i += 1;
        }
        while a.greater(j as usize, p) {
            j -= 1;
        }
        if i <= j {
            let (iu, ju) = (i as usize, j as usize);
            a.swap(iu, ju);
            // follow the pivot if it was swapped
            p = if p == iu {
                ju
            } else if p == ju {
                iu
            } else {
                p
            };
            i += 1;
            j -= 1;
        }
    }

    if (lo as isize) < j {
        quick_sort_lr_range(a, rule, lo, j as usize);
    }
    if i < hi as isize {
        quick_sort_lr_range(a, rule, i as usize, hi);
    }
}

/// Lomuto partitioning, pivot moved to the right end.
pub fn quick_sort_ll(a: &mut SortArray<'_>) {
    if a.len() < 2 {
        return;
    }
    let rule = PivotRule::random();
    quick_sort_ll_range(a, rule, 0, a.len() - 1);
}

fn partition_ll(a: &mut SortArray<'_>, rule: PivotRule, lo: usize, hi: usize) -> usize {
    let p = rule.select(a, lo, hi + 1);
    a.swap(p, hi);

    let mut i = lo;
    for j in lo..hi {
        if a.less(j, hi) {
            a.swap(i, j);
            i += 1;
        }
    }
    a.swap(i, hi);
    i
}

fn quick_sort_ll_range(a: &mut SortArray<'_>, rule: PivotRule, lo: usize, hi: usize) {
    if lo >= hi || a.cancelled() {
        return;
    }
    let mid = partition_ll(a, rule, lo, hi);
    if mid > lo {
        quick_sort_ll_range(a, rule, lo, mid - 1);
    }
    quick_sort_ll_range(a, rule, mid + 1, hi);
}

/// Yaroslavskiy's dual-pivot partitioning.
pub fn quick_sort_dual_pivot(a: &mut SortArray<'_>) {
    if a.len() < 2 {
        return;
    }
    dual_pivot_range(a, 0, a.len() as isize - 1);
}

fn dual_pivot_range(a: &mut SortArray<'_>, left: isize, right: isize) {
    if right <= left || a.cancelled() {
        return;
    }
    let (lu, ru) = (left as usize, right as usize);
    if a.greater(lu, ru) {
        a.swap(lu, ru);
    }
    let p = a.get(lu);
    let q = a.get(ru);

    let mut l = left + 1;
    let mut g = right - 1;
    let mut k = l;

    while k <= g {
        if a.less(k as usize, &p) {
            a.swap(k as usize, l as usize);
            l += 1;
        } else if a.greater_equal(k as usize, &q) {
            while a.greater(g as usize, &q) && k < g {
                g -= 1;
            }
            a.swap(k as usize, g as usize);
            g -= 1;

            if a.less(k as usize, &p) {
                a.swap(k as usize, l as usize);
                l += 1;
            }
        }
        k += 1;
    }
    l -= 1;
    g += 1;
    a.swap(lu, l as usize);
    a.swap(ru, g as usize);

    dual_pivot_range(a, left, l - 1);
    dual_pivot_range(a, l + 1, g - 1);
    dual_pivot_range(a, g + 1, right);
}

// *** merge sorts

/// Out-of-place merge of `lo..mid` and `mid..hi`.
fn merge(a: &mut SortArray<'_>, lo: usize, mid: usize, hi: usize) {
    let mut out = Vec::with_capacity(hi - lo);
    let (mut i, mut j) = (lo, mid);
    while i < mid && j < hi {
        if a.less(i, j) {
            out.push(a.take(i));
            i += 1;
        } else {
            out.push(a.take(j));
            j += 1;
        }
    }
    while i < mid {
        out.push(a.take(i));
        i += 1;
    }
    while j < hi {
        out.push(a.take(j));
        j += 1;
    }
    for (k, item) in out.into_iter().enumerate() {
        a.put(lo + k, item);
    }
}

pub fn merge_sort(a: &mut SortArray<'_>) {
    let n = a.len();
    merge_sort_range(a, 0, n);
}

fn merge_sort_range(a: &mut SortArray<'_>, lo: usize, hi: usize) {
    if a.cancelled() || lo + 1 >= hi {
        return;
    }
    let mid = (lo + hi) / 2;
    merge_sort_range(a, lo, mid);
    merge_sort_range(a, mid, hi);
    merge(a, lo, mid, hi);
}

pub fn merge_sort_iterative(a: &mut SortArray<'_>) {
    let n = a.len();
    let mut s = 1;
    while s < n {
        if a.cancelled() {
            return;
        }
        let mut i = 0;
        while i + s < n {
            merge(a, i, i + s, (i + 2 * s).min(n));
            i += 2 * s;
        }
        s *= 2;
    }
}

// *** shell and heap

const SHELL_INCREMENTS: [usize; 16] = [
    1391376, 463792, 198768, 86961, 33936, 13776, 4592, 1968, 861, 336, 112, 48, 21, 7, 3, 1,
];

pub fn shell_sort(a: &mut SortArray<'_>) {
    let n = a.len();
    for &h in SHELL_INCREMENTS.iter() {
        if a.cancelled() {
            return;
        }
        for i in h..n {
            let v = a.get(i);
            let mut j = i;
            while j >= h && a.greater(j - h, &v) {
                a.assign(j, j - h);
                j -= h;
            }
            a.set(j, &v);
        }
    }
}

pub fn heap_sort(a: &mut SortArray<'_>) {
    let mut n = a.len();
    let mut i = n / 2;

    while !a.cancelled() {
        if i > 0 {
            // build heap, sift a[i] down
            i -= 1;
        } else {
            // pop the largest element to the back and sift a[0] down
            if n <= 1 {
                return;
            }
            n -= 1;
            a.swap(0, n);
        }

        let mut parent = i;
        let mut child = i * 2 + 1;
        while child < n {
            if child + 1 < n && a.greater(child + 1, child) {
                child += 1;
            }
            if a.greater(child, parent) {
                a.swap(parent, child);
                parent = child;
                child = parent * 2 + 1;
            } else {
                break;
            }
        }
    }
}

// *** cycle sort

/// Rank finding scans use direct comparisons and charge the counter
/// explicitly, so one scan shows up as a single quiet step.
pub fn cycle_sort(a: &mut SortArray<'_>) {
    let n = a.len();
    let mut cycle_start = 0;
    while cycle_start + 1 < n {
        if a.cancelled() {
            return;
        }
        loop {
            let mut rank = cycle_start;
            for i in cycle_start + 1..n {
                if a.less_direct(i, cycle_start) {
                    rank += 1;
                }
                a.increment_counter();
            }

            if rank == cycle_start {
                break;
            }

            // place after any duplicates
            while a.equal(cycle_start, rank) {
                rank += 1;
            }

            a.swap(rank, cycle_start);

            if rank == cycle_start {
                break;
            }
        }
        cycle_start += 1;
    }
}

// *** radix sorts

const RADIX: usize = 4;

/// Largest `p` with `RADIX^p <= n` (0 for `n <= 1`).
fn floor_log_radix(n: usize) -> u32 {
    let mut p = 0;
    let mut base = RADIX;
    while base <= n {
        p += 1;
        base = base.saturating_mul(RADIX);
    }
    p
}

/// Smallest `p` with `RADIX^p >= n`.
fn ceil_log_radix(n: usize) -> u32 {
    let mut p = 0;
    let mut base = 1usize;
    while base < n {
        p += 1;
        base = base.saturating_mul(RADIX);
    }
    p
}

fn digit(value: u16, base: usize) -> usize {
    usize::from(value) / base % RADIX
}

/// Most significant digit first, in-place redistribution by walking cycles.
pub fn radix_sort_msd(a: &mut SortArray<'_>) {
    let n = a.len();
    if n < 2 {
        return;
    }
    let pmax = floor_log_radix(n);
    radix_msd_range(a, pmax, 0, n, 0);
}

fn radix_msd_range(a: &mut SortArray<'_>, pmax: u32, lo: usize, hi: usize, depth: u32) {
    if a.cancelled() {
        return;
    }
    let base = RADIX.pow(pmax - depth);

    let mut count = [0usize; RADIX];
    for i in lo..hi {
        count[digit(a.value(i), base)] += 1;
    }

    // inclusive prefix sum
    let mut bkt = [0usize; RADIX];
    let mut sum = 0;
    for (b, c) in bkt.iter_mut().zip(count.iter()) {
        sum += c;
        *b = sum;
    }

    let mut i = 0;
    while i < hi - lo {
        loop {
            let r = digit(a.value(lo + i), base);
            bkt[r] -= 1;
            let j = bkt[r];
            if j <= i {
                break;
            }
            a.swap(lo + i, lo + j);
        }
        i += count[digit(a.value(lo + i), base)];
    }

    if depth + 1 > pmax {
        return;
    }

    let mut start = lo;
    for &c in count.iter() {
        if c > 1 {
            radix_msd_range(a, pmax, start, start + c, depth + 1);
        }
        start += c;
    }
}

/// Least significant digit first, out-of-place and stable.
pub fn radix_sort_lsd(a: &mut SortArray<'_>) {
    let n = a.len();
    let pmax = ceil_log_radix(n);

    for p in 0..pmax {
        if a.cancelled() {
            return;
        }
        let base = RADIX.pow(p);

        let mut count = [0usize; RADIX];
        let mut copy = Vec::with_capacity(n);
        for i in 0..n {
            let item = a.get(i);
            count[digit(a.value(&item), base)] += 1;
            copy.push(item);
        }

        // exclusive prefix sum
        let mut bkt = [0usize; RADIX];
        for r in 1..RADIX {
            bkt[r] = bkt[r - 1] + count[r - 1];
        }

        for item in &copy {
            let r = digit(a.value(item), base);
            a.set(bkt[r], item);
            bkt[r] += 1;
        }
    }
}
