use reelbase_core::db::open_pool;
use reelbase_core::model::movie::MOVIE_SORT_SAFELIST;
use reelbase_core::model::user::USER_SORT_SAFELIST;
use reelbase_core::{
    DbConfig, ErrorKind, FilterError, Filters, MovieFilter, MovieService, MovieUpdate, NewMovie,
    NewUser, Repositories, Runtime, ServiceError, UserService, UserUpdate,
};
use std::time::Duration;

fn repositories() -> Repositories {
    Repositories::new(
        open_pool(&DbConfig::in_memory()).unwrap(),
        Duration::from_secs(3),
    )
}

fn up() -> NewMovie {
    NewMovie {
        title: "Up".to_string(),
        year: 2009,
        runtime: Runtime(96),
        genres: vec!["animation".to_string(), "adventure".to_string()],
    }
}

#[test]
fn create_movie_validates_before_writing() {
    let repos = repositories();
    let service = MovieService::new(repos.movies.clone());

    let err = service
        .create_movie(NewMovie {
            year: 1700,
            genres: Vec::new(),
            ..up()
        })
        .unwrap_err();

    let errors = match err {
        ServiceError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other}"),
    };
    assert_eq!(errors.get("year"), Some("must be greater than 1888"));
    assert_eq!(errors.get("genres"), Some("must contain at least 1 genre"));

    let (_, metadata) = service
        .list_movies(&MovieFilter::default(), &Filters::new(MOVIE_SORT_SAFELIST))
        .unwrap();
    assert_eq!(metadata.total_records, 0);
}

#[test]
fn update_movie_merges_patch_and_checks_expected_version() {
    let service = MovieService::new(repositories().movies);
    let movie = service.create_movie(up()).unwrap();

    let patch = MovieUpdate {
        runtime: Some(Runtime(97)),
        ..MovieUpdate::default()
    };
    let stale = service
        .update_movie(movie.id, patch.clone(), Some(0))
        .unwrap_err();
    assert_eq!(stale.kind(), Some(ErrorKind::EditConflict));

    let updated = service.update_movie(movie.id, patch, Some(1)).unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.runtime, Runtime(97));
    assert_eq!(updated.title, "Up");

    let unchecked = service
        .update_movie(movie.id, MovieUpdate::default(), None)
        .unwrap();
    assert_eq!(unchecked.version, 3);
}

#[test]
fn update_movie_rejects_invalid_merge() {
    let service = MovieService::new(repositories().movies);
    let movie = service.create_movie(up()).unwrap();

    let err = service
        .update_movie(
            movie.id,
            MovieUpdate {
                title: Some(String::new()),
                ..MovieUpdate::default()
            },
            None,
        )
        .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(service.get_movie(movie.id).unwrap().version, 1);
}

#[test]
fn list_movies_validates_paging_and_sort_table() {
    let service = MovieService::new(repositories().movies);

    let err = service
        .list_movies(
            &MovieFilter::default(),
            &Filters::new(MOVIE_SORT_SAFELIST).with_page(0, 500),
        )
        .unwrap_err();
    let errors = match err {
        ServiceError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other}"),
    };
    assert!(errors.contains("page"));
    assert!(errors.contains("page_size"));

    let foreign = Filters::new(USER_SORT_SAFELIST).with_sort("email");
    assert!(matches!(
        service.list_movies(&MovieFilter::default(), &foreign),
        Err(ServiceError::Filter(FilterError::UnknownSortColumn {
            table: "movies",
            column: "email",
        }))
    ));
}

#[test]
fn delete_movie_reports_missing_records() {
    let service = MovieService::new(repositories().movies);
    let movie = service.create_movie(up()).unwrap();

    service.delete_movie(movie.id).unwrap();
    assert_eq!(
        service.delete_movie(movie.id).unwrap_err().kind(),
        Some(ErrorKind::NotFound)
    );
}

#[test]
fn register_user_checks_plaintext_password_and_duplicates() {
    let service = UserService::new(repositories().users);
    let registration = NewUser {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        password: "pa55word".to_string(),
    };

    let short = service
        .register_user(
            NewUser {
                password: "short".to_string(),
                ..registration.clone()
            },
            b"hash".to_vec(),
        )
        .unwrap_err();
    assert!(matches!(short, ServiceError::Validation(_)));

    let alice = service
        .register_user(registration.clone(), b"hash".to_vec())
        .unwrap();
    assert!(!alice.activated);
    assert_eq!(alice.version, 1);

    let duplicate = service
        .register_user(registration, b"hash".to_vec())
        .unwrap_err();
    assert_eq!(duplicate.kind(), Some(ErrorKind::DuplicateValue));
}

#[test]
fn user_lookup_and_activation() {
    let service = UserService::new(repositories().users);
    let user = service
        .register_user(
            NewUser {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "pa55word".to_string(),
            },
            b"hash".to_vec(),
        )
        .unwrap();

    assert!(matches!(
        service.get_user_by_email("not-an-email"),
        Err(ServiceError::Validation(_))
    ));
    assert_eq!(service.get_user_by_email("BOB@example.com").unwrap().id, user.id);

    let activated = service
        .update_user(
            user.id,
            UserUpdate {
                activated: Some(true),
                ..UserUpdate::default()
            },
            Some(user.version),
        )
        .unwrap();
    assert!(activated.activated);
    assert_eq!(activated.version, 2);
    assert_eq!(service.get_user(user.id).unwrap().version, 2);

    service.delete_user(user.id).unwrap();
    assert_eq!(
        service.get_user(user.id).unwrap_err().kind(),
        Some(ErrorKind::NotFound)
    );
    let (users, _) = service
        .list_users(&Default::default(), &Filters::new(USER_SORT_SAFELIST))
        .unwrap();
    assert!(users.is_empty());
}
