use reelbase_core::db::open_pool;
use reelbase_core::{
    DbConfig, ErrorKind, Movie, MovieRepository, NewMovie, RecordRepository, RepoError, Runtime,
};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn memory_repo() -> MovieRepository {
    MovieRepository::new(open_pool(&DbConfig::in_memory()).unwrap())
}

fn up() -> Movie {
    Movie::from_new(NewMovie {
        title: "Up".to_string(),
        year: 2009,
        runtime: Runtime(96),
        genres: vec!["animation".to_string(), "adventure".to_string()],
    })
}

#[test]
fn create_assigns_identity_and_first_version() {
    let repo = memory_repo();
    let mut movie = up();

    let created = repo.create(&mut movie).unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.version, 1);
    assert!(created.created_at > 0);
    assert_eq!(movie.id, created.id);
    assert_eq!(movie.version, 1);
    assert_eq!(movie.created_at, created.created_at);
}

#[test]
fn create_then_get_round_trips_business_fields() {
    let repo = memory_repo();
    let mut movie = up();
    repo.create(&mut movie).unwrap();

    let loaded = repo.get(movie.id).unwrap();
    assert_eq!(loaded, movie);
    assert_eq!(loaded.genres, vec!["animation", "adventure"]);
    assert_eq!(loaded.runtime, Runtime(96));
}

#[test]
fn stale_version_conflicts_and_current_version_advances() {
    let repo = memory_repo();
    let mut movie = up();
    repo.create(&mut movie).unwrap();

    let mut stale = movie.clone();
    stale.version = 0;
    stale.year = 2010;
    let err = repo.update(&mut stale).unwrap_err();
    assert!(matches!(err, RepoError::EditConflict));
    assert_eq!(stale.version, 0);

    movie.title = "Up (2009)".to_string();
    assert_eq!(repo.update(&mut movie).unwrap(), 2);
    assert_eq!(movie.version, 2);

    let loaded = repo.get(movie.id).unwrap();
    assert_eq!(loaded.version, 2);
    assert_eq!(loaded.title, "Up (2009)");
    assert_eq!(loaded.year, 2009);
}

#[test]
fn second_update_from_same_read_conflicts() {
    let repo = memory_repo();
    let mut movie = up();
    repo.create(&mut movie).unwrap();

    let mut first = movie.clone();
    let mut second = movie.clone();
    repo.update(&mut first).unwrap();

    let err = repo.update(&mut second).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EditConflict);
}

#[test]
fn update_of_missing_record_conflicts() {
    let repo = memory_repo();
    let mut ghost = up();
    ghost.id = 42;
    ghost.version = 1;

    assert_eq!(
        repo.update(&mut ghost).unwrap_err().kind(),
        ErrorKind::EditConflict
    );
}

#[test]
fn get_rejects_non_positive_and_missing_ids() {
    let repo = memory_repo();
    for id in [-1, 0, 999] {
        assert_eq!(repo.get(id).unwrap_err().kind(), ErrorKind::NotFound, "id {id}");
    }
}

#[test]
fn delete_removes_record_and_reports_missing() {
    let repo = memory_repo();
    let mut movie = up();
    repo.create(&mut movie).unwrap();

    repo.delete(movie.id).unwrap();
    assert!(matches!(repo.get(movie.id), Err(RepoError::NotFound)));
    assert!(matches!(repo.delete(movie.id), Err(RepoError::NotFound)));
    assert!(matches!(repo.delete(0), Err(RepoError::NotFound)));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let repo = memory_repo();
    let mut first = up();
    repo.create(&mut first).unwrap();
    repo.delete(first.id).unwrap();

    let mut second = up();
    repo.create(&mut second).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn exhausted_deadline_is_infrastructure_not_not_found() {
    let repo = memory_repo();
    let mut movie = up();
    repo.create(&mut movie).unwrap();

    let hurried = repo.clone().with_timeout(Duration::from_nanos(1));
    let err = hurried.get(movie.id).unwrap_err();

    assert!(matches!(err, RepoError::DeadlineExceeded { .. }));
    assert_eq!(err.kind(), ErrorKind::Infrastructure);
    assert_eq!(repo.timeout(), Duration::from_secs(3));
}

#[test]
fn concurrent_updates_from_same_version_have_one_winner() {
    const WRITERS: usize = 8;

    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig {
        dsn: dir.path().join("movies.db").to_string_lossy().into_owned(),
        max_open_conns: WRITERS as u32,
        max_idle_conns: 2,
        ..DbConfig::default()
    };
    let repo = MovieRepository::new(open_pool(&config).unwrap());
    let mut movie = up();
    repo.create(&mut movie).unwrap();

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles = (0..WRITERS)
        .map(|writer| {
            let repo = repo.clone();
            let barrier = Arc::clone(&barrier);
            let mut copy = movie.clone();
            thread::spawn(move || {
                copy.title = format!("Up take {writer}");
                barrier.wait();
                repo.update(&mut copy).map_err(|err| err.kind())
            })
        })
        .collect::<Vec<_>>();

    let outcomes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(winners, 1, "{outcomes:?}");
    assert!(outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().err())
        .all(|kind| *kind == ErrorKind::EditConflict));
    assert_eq!(repo.get(movie.id).unwrap().version, 2);
}
