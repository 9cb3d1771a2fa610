use academy_core::access::{Navigation, Route};
use academy_core::model::{CourseId, CourseListingDraft, ModuleId, PublishStatus};
use academy_core::time::fixed_clock;
use services::{AppServices, CatalogServiceError};

#[tokio::test]
async fn admin_manages_catalog_until_logout() {
    let mut app = AppServices::in_memory(fixed_clock()).await.unwrap();
    assert!(!app
        .gate_mut()
        .login("admin@tum-academy.de", "nope")
        .await
        .unwrap());
    assert!(app
        .gate_mut()
        .login("admin@tum-academy.de", "password")
        .await
        .unwrap());
    assert_eq!(
        app.gate().navigate(Route::from_path("/admin/modules/1")),
        Navigation::Render(Route::AdminModules {
            course_id: CourseId::new("1")
        })
    );

    let catalog = app.catalog();
    let actor = app.gate().current().cloned();

    let course = catalog
        .create_course(
            actor.as_ref(),
            CourseListingDraft {
                title: "Personenbeförderungsrecht".into(),
                description: "PBefG kompakt".into(),
                price: "149 €".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(course.status, PublishStatus::Draft);

    let overview = catalog.overview(actor.as_ref()).await.unwrap();
    assert_eq!(overview.total_courses, 3);
    assert_eq!(overview.published_courses, 1);

    let course_one = CourseId::new("1");
    assert!(catalog
        .move_module_down(actor.as_ref(), &course_one, &ModuleId::new("m1"))
        .await
        .unwrap());
    let ids: Vec<String> = catalog
        .list_modules(actor.as_ref(), &course_one, "")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id.as_str().to_owned())
        .collect();
    assert_eq!(ids, vec!["m2", "m1", "m3", "m4"]);

    app.gate_mut().logout().await.unwrap();
    let after = app.gate().current().cloned();
    assert!(matches!(
        catalog.overview(after.as_ref()).await,
        Err(CatalogServiceError::Forbidden)
    ));
    assert_eq!(
        app.gate().navigate(Route::Admin),
        Navigation::Redirect(Route::Login)
    );
}
