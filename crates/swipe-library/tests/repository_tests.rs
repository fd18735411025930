//! Library repository integration tests

use swipe_library::{
    NewLikedPaper, NewPaper, Repository, ResearchInterest, ResearchLevel, Schema, SCHEMA_VERSION,
};
use tempfile::TempDir;

fn card(title: &str) -> NewLikedPaper {
    NewLikedPaper {
        paper_title: title.to_string(),
        authors: "Vera Rubin, Kent Ford".to_string(),
        date: "1970".to_string(),
        background: "linear-gradient(to right, #ffc3a0 0%, #ffafbd 100%)".to_string(),
        topic: Some("Galaxies and Cosmology".to_string()),
        topic_color: Some("#FFE0E0".to_string()),
        doi: Some("10.1086/150317".to_string()),
    }
}

#[test]
fn test_library_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.sqlite");

    {
        let repo = Repository::new(&path).unwrap();
        repo.like("reader", card("Rotation of the Andromeda Nebula")).unwrap();
        repo.save_profile(
            "reader",
            vec![ResearchInterest::new("Dark matter", ResearchLevel::Expert)],
            vec!["Spectroscopy".to_string()],
        )
        .unwrap();
        repo.replace_interests("reader", vec!["Dark matter".to_string()])
            .unwrap();
    }

    let repo = Repository::new(&path).unwrap();
    assert_eq!(repo.schema_version(), Some(SCHEMA_VERSION));

    let liked = repo.liked_papers("reader").unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].paper_title, "Rotation of the Andromeda Nebula");
    assert_eq!(liked[0].topic_color.as_deref(), Some("#FFE0E0"));
    assert_eq!(liked[0].doi.as_deref(), Some("10.1086/150317"));

    let profile = repo.profile("reader").unwrap().unwrap();
    assert_eq!(profile.interests(), vec!["Dark matter".to_string()]);
    assert_eq!(profile.research_fields[0].level, ResearchLevel::Expert);

    assert_eq!(repo.interests("reader").unwrap(), vec!["Dark matter".to_string()]);
}

#[test]
fn test_liked_papers_keep_like_order() {
    let repo = Repository::in_memory().unwrap();
    for title in ["First", "Second", "Third"] {
        repo.like("reader", card(title)).unwrap();
    }
    repo.unlike("reader", "Second").unwrap();
    repo.like("reader", card("Second")).unwrap();

    let titles: Vec<_> = repo
        .liked_papers("reader")
        .unwrap()
        .into_iter()
        .map(|p| p.paper_title)
        .collect();
    assert_eq!(titles, vec!["First", "Third", "Second"]);
}

#[test]
fn test_two_connections_share_likes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.sqlite");

    let a = Repository::new(&path).unwrap();
    let b = Repository::new(&path).unwrap();

    a.like("reader", card("Shared")).unwrap();
    assert!(b.is_liked("reader", "Shared").unwrap());
    assert!(!b.toggle_like("reader", card("Shared")).unwrap());
    assert!(!a.is_liked("reader", "Shared").unwrap());
}

#[test]
fn test_version_one_database_gains_papers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.sqlite");

    // A library written before feed candidates were stored.
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(Schema::create_tables()).unwrap();
        conn.execute_batch("DROP TABLE papers").unwrap();
        conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])
            .unwrap();
    }
    {
        let repo = Repository::new(&path).unwrap();
        repo.like("reader", card("Kept across upgrade")).unwrap();
    }

    let repo = Repository::new(&path).unwrap();
    assert_eq!(repo.schema_version(), Some(SCHEMA_VERSION));
    assert!(repo.is_liked("reader", "Kept across upgrade").unwrap());

    repo.add_paper(NewPaper::new("Fresh", vec![1.0], vec![1.0], vec![1.0]))
        .unwrap();
    assert_eq!(repo.paper_candidates().unwrap().len(), 1);
}
