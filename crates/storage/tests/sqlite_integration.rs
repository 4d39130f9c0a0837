use ditto_core::model::{
    AudioRef, Course, CourseId, LearnerProfile, ProficiencyLevel, Sentence, SentenceId,
};
use ditto_core::time::fixed_now;
use storage::repository::{
    CourseRepository, NewCourseRecord, ProfileRecord, ProfileRepository,
};
use storage::sqlite::SqliteRepository;

fn build_course(title: &str) -> Course {
    let sentences = vec![
        Sentence::new(
            SentenceId::new(1),
            "Bonjour, comment ça va ?",
            "Hello, how are you?",
            AudioRef::new("audio/1.m4a"),
        )
        .unwrap(),
        Sentence::new(
            SentenceId::new(2),
            "Très bien, merci",
            "Very well, thanks",
            AudioRef::new("audio/2.m4a"),
        )
        .unwrap(),
    ];
    Course::new(CourseId::new(1), title, "fr-FR", sentences, fixed_now()).unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_sentence_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_courses?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let course = build_course("At the café");
    let id = repo
        .insert_course(NewCourseRecord::from_course(&course))
        .await
        .unwrap();

    let fetched = repo.get_course(id).await.unwrap().expect("course exists");
    assert_eq!(fetched.title(), "At the café");
    assert_eq!(fetched.locale(), "fr-FR");
    assert_eq!(fetched.len(), 2);
    assert_eq!(
        fetched.sentence(0).unwrap().reference_text(),
        "Bonjour, comment ça va ?"
    );
    assert_eq!(fetched.sentence(1).unwrap().reference_text(), "Très bien, merci");
    assert_eq!(fetched.sentence(1).unwrap().audio_ref().as_str(), "audio/2.m4a");
}

#[tokio::test]
async fn sqlite_allocates_course_ids_and_lists_in_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_course_ids?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = repo
        .insert_course(NewCourseRecord::from_course(&build_course("First")))
        .await
        .unwrap();
    let second = repo
        .insert_course(NewCourseRecord::from_course(&build_course("Second")))
        .await
        .unwrap();
    assert!(second > first);

    let courses = repo.list_courses(10).await.unwrap();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0].title(), "First");
    assert_eq!(courses[1].title(), "Second");

    assert!(repo.get_course(CourseId::new(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_profile_is_single_row() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_profile?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.get_profile().await.unwrap().is_none());

    let first =
        LearnerProfile::new("French", ProficiencyLevel::Beginner, None).unwrap();
    repo.save_profile(&ProfileRecord::from_profile(&first, fixed_now()))
        .await
        .unwrap();

    let second = LearnerProfile::new(
        "Italian",
        ProficiencyLevel::Intermediate,
        Some("cooking, travel".into()),
    )
    .unwrap();
    repo.save_profile(&ProfileRecord::from_profile(&second, fixed_now()))
        .await
        .unwrap();

    let fetched = repo.get_profile().await.unwrap().expect("profile exists");
    let profile = fetched.into_profile().unwrap();
    assert_eq!(profile, second);
}
