use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use ragfuse_cli::{load_engine, render_ranking};
use ragfuse_core::config::{Settings, SynonymGroup};
use ragfuse_embed::HashEmbedder;

fn write_corpus(dir: &std::path::Path) {
    fs::write(
        dir.join("homestead.jsonl"),
        concat!(
            "{\"id\": 1, \"extract_id\": 7, \"url\": \"https://example.com/stove\", \"text\": \"Clean the wood stove chimney every autumn.\"}\n",
            "{\"id\": 2, \"extract_id\": 7, \"url\": \"https://example.com/stove\", \"text\": \"A hot stove needs a steel ash bucket.\"}\n",
            "{\"id\": 3, \"extract_id\": 9, \"url\": \"https://example.com/meter\", \"text\": \"Top up a prepaid meter online.\"}\n",
        ),
    )
    .unwrap();
}

#[test]
fn loads_corpus_and_ranks_without_stored_vectors() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let settings = Settings { corpus: ragfuse_core::config::CorpusConfig { dir: String::new(), embedding_dim: 32 }, ..Settings::default() };
    let embedder = Arc::new(HashEmbedder::new(32).unwrap());

    let engine = load_engine(&settings, tmp.path(), embedder, false).expect("engine");
    assert_eq!(engine.snapshot().unwrap().stats().doc_count, 3);

    let r = engine.retrieve("wood stove", 2).expect("retrieve");
    assert_eq!(r.ranking.len(), 2);
    assert_eq!(r.ranking[0].chunk_id, 1);

    let text = render_ranking(&r);
    assert!(text.starts_with("candidates: vector=3 bm25=2 merged=3"));
    assert!(text.contains("chunk=1 https://example.com/stove"));
}

#[test]
fn configured_synonyms_expand_queries() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let settings = Settings {
        synonyms: vec![SynonymGroup {
            canonical: "myway".into(),
            aliases: vec!["myway".into(), "prepaid".into()],
            note: String::new(),
        }],
        ..Settings::default()
    };
    let embedder = Arc::new(HashEmbedder::new(32).unwrap());
    let engine = load_engine(&settings, tmp.path(), embedder, false).expect("engine");

    let r = engine.retrieve("MyWay top up", 3).expect("retrieve");
    assert!(r.debug.query_variants.len() > 1);
    assert_eq!(r.ranking[0].chunk_id, 3);
}

#[test]
fn missing_corpus_dir_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let embedder = Arc::new(HashEmbedder::new(32).unwrap());
    let err = load_engine(&Settings::default(), &tmp.path().join("nope"), embedder, false).err().expect("error");
    assert!(format!("{err:#}").contains("loading corpus"));
}
