//! Interning under contention, through the public surface: two threads
//! hammer one shared domain name while fifty more intern distinct names.
//! Every call must return a valid handle, the shared name must resolve to a
//! single identity, and the distinct names must stay distinct.

use crossbeam_channel::unbounded;
use std::thread;
use tracegate::Domain;

#[test]
fn racing_creates_agree_on_one_winner() {
    let (tx, rx) = unbounded();

    let mut workers = Vec::new();
    for _ in 0..2 {
        let tx = tx.clone();
        workers.push(thread::spawn(move || {
            for _ in 0..1000 {
                let domain = Domain::create("Race.X");
                assert!(domain.is_valid());
                tx.send(domain).unwrap();
            }
        }));
    }
    for i in 0..50 {
        let tx = tx.clone();
        workers.push(thread::spawn(move || {
            let domain = Domain::create(&format!("Race.Y_{i}"));
            assert!(domain.is_valid());
            tx.send(domain).unwrap();
        }));
    }
    drop(tx);
    for worker in workers {
        worker.join().unwrap();
    }

    let handles: Vec<Domain> = rx.iter().collect();
    assert_eq!(handles.len(), 2050);

    let x = Domain::create("Race.X");
    let x_count = handles.iter().filter(|&&handle| handle == x).count();
    assert_eq!(x_count, 2000, "every Race.X create returned the same handle");

    let mut y_seqs: Vec<u64> = handles
        .iter()
        .filter(|&&handle| handle != x)
        .map(Domain::seq)
        .collect();
    y_seqs.sort_unstable();
    y_seqs.dedup();
    assert_eq!(y_seqs.len(), 50, "fifty distinct Race.Y_i identities");
}

#[test]
fn concurrent_task_churn_stays_isolated() {
    let domain = Domain::create("Race.Churn");
    let mut workers = Vec::new();
    for t in 0..4 {
        workers.push(thread::spawn(move || {
            let name = tracegate::StringHandle::create(&format!("Thread{t}_Task"));
            for _ in 0..50 {
                domain.task_begin(name);
                domain.task_end();
            }
        }));
    }
    for worker in workers {
        worker.join().unwrap();
    }
}
