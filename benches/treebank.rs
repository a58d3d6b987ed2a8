use divan::AllocProfiler;
use divan::{Bencher, black_box};
use treebank::{EnglishHeadFinder, Fill, LabelMap, Parser, parse_all};

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

const SENTENCES: &[&str] = &[
    "( (S (NP-SBJ (NP (NNP Pierre) (NNP Vinken)) (, ,) (ADJP (NP (CD 61) (NNS years)) (JJ old)) (, ,)) (VP (MD will) (VP (VB join) (NP (DT the) (NN board)) (PP-CLR (IN as) (NP (DT a) (JJ nonexecutive) (NN director))) (NP-TMP (NNP Nov.) (CD 29)))) (. .)) )",
    "( (S (NP-SBJ (NNP Mr.) (NNP Vinken)) (VP (VBZ is) (NP-PRD (NP (NN chairman)) (PP (IN of) (NP (NP (NNP Elsevier) (NNP N.V.)) (, ,) (NP (DT the) (NNP Dutch) (VBG publishing) (NN group)))))) (. .)) )",
    "( (S (NP-SBJ-1 (DT The) (NN bill)) (VP (VBZ is) (VP (VBN expected) (S (NP-SBJ (-NONE- *-1)) (VP (TO to) (VP (VB pass))))))) (. .)) )",
    "(())",
];

/// A corpus of `n` trees cycling through the sample sentences
fn corpus(n: usize) -> String {
    SENTENCES.iter().cycle().take(n).copied().collect::<Vec<_>>().join("\n")
}

#[divan::bench(args = [100, 1000])]
fn parse(bencher: Bencher, n: usize) {
    let text = corpus(n);
    bencher.bench_local(|| {
        for result in Parser::over_str(black_box(&text)) {
            black_box(result.unwrap());
        }
    });
}

#[divan::bench(args = [100, 1000])]
fn fill_everything(bencher: Bencher, n: usize) {
    let (mut trees, _) = parse_all(corpus(n).as_bytes());
    for tree in trees.iter_mut() {
        tree.strip_annotation().remove_none();
    }
    let finder = EnglishHeadFinder::new();
    let mut labels = LabelMap::new();
    bencher.bench_local(|| {
        for tree in trees.iter_mut() {
            tree.fill(Fill::EVERYTHING, Some(&mut labels), Some(&finder));
        }
        black_box(&trees);
    });
}

#[divan::bench(args = [100, 1000])]
fn strip_and_remove_none(bencher: Bencher, n: usize) {
    let (trees, _) = parse_all(corpus(n).as_bytes());
    bencher.bench_local(|| {
        for tree in trees.iter() {
            let mut tree = tree.clone();
            black_box(tree.strip_annotation().remove_none());
        }
    });
}
