use ragchat_engine::{ChatKey, RetrievalConfig, RetrievalEngine};
use ragchat_text_chunker::Chunker;
use ragchat_vector_store::EmbeddingModel;
use std::sync::Arc;
use std::thread;

#[test]
fn parallel_ingest_and_clear_keep_counts_in_step() {
    let engine = Arc::new(RetrievalEngine::new(
        Arc::new(EmbeddingModel::stub(32)),
        Chunker::default(),
        RetrievalConfig::default(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let key = ChatKey::from(worker % 2);
                for round in 0..20 {
                    let text = format!("worker {worker} round {round}. second sentence");
                    engine.ingest_text(&key, "mem.txt", &text).unwrap();
                    if round % 7 == 0 {
                        engine.clear(&key);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for key in engine.chat_keys() {
        let chunks = engine.chunk_count(&key);
        assert_eq!(chunks, engine.vector_count(&key));
        assert_eq!(chunks % 2, 0);
    }
}
