//! Behavior-driven tests for client routes, the access guard and the menu.

use marketmon_core::{
    greeting, guard, nav_links, GuardDecision, InstrumentId, RedirectReason, Role, Route,
    SessionAction, SessionState, ValidationError,
};
use marketmon_tests::ana_credential as credential;

fn every_route() -> Vec<Route> {
    vec![
        Route::Login,
        Route::Register,
        Route::Instruments,
        Route::Favorites,
        Route::InstrumentDetail(InstrumentId::new(3)),
        Route::AdminUsers,
    ]
}

// =============================================================================
// Guard decisions
// =============================================================================

#[test]
fn when_nobody_is_signed_in_only_public_pages_render() {
    for route in every_route() {
        // When: an anonymous visitor opens the route
        let decision = guard(route, None);

        // Then: public pages render, everything else goes to /login
        if route.is_public() {
            assert_eq!(decision, GuardDecision::Allow, "{route}");
        } else {
            assert_eq!(
                decision,
                GuardDecision::Redirect {
                    to: Route::Login,
                    reason: RedirectReason::Unauthenticated,
                },
                "{route}"
            );
        }
    }
}

#[test]
fn when_a_user_is_signed_in_everything_but_admin_renders() {
    let user = credential(Role::User);

    for route in every_route() {
        let decision = guard(route, Some(&user));

        assert_eq!(decision.is_allowed(), !route.requires_admin(), "{route}");
    }
    assert_eq!(
        guard(Route::AdminUsers, Some(&user)),
        GuardDecision::Redirect {
            to: Route::Instruments,
            reason: RedirectReason::NotAdmin,
        }
    );
}

#[test]
fn when_an_admin_is_signed_in_every_route_renders() {
    let admin = credential(Role::Admin);

    assert!(every_route()
        .into_iter()
        .all(|route| guard(route, Some(&admin)).is_allowed()));
}

// =============================================================================
// Paths
// =============================================================================

#[test]
fn every_route_survives_a_trip_through_its_path() {
    for route in every_route() {
        assert_eq!(Route::parse(&route.path()).expect("known path"), route);
    }
}

#[test]
fn browser_style_paths_are_normalized() {
    assert_eq!(Route::parse("/favorites/").expect("trailing"), Route::Favorites);
    assert_eq!(
        Route::parse("/instrument/12?tab=chart#top").expect("query"),
        Route::InstrumentDetail(InstrumentId::new(12))
    );
    assert_eq!("/".parse::<Route>().expect("root"), Route::Instruments);
}

#[test]
fn malformed_paths_are_rejected_with_the_reason() {
    assert!(matches!(
        Route::parse("/instrument/abc"),
        Err(ValidationError::InvalidInstrumentId { .. })
    ));
    assert!(matches!(
        Route::parse("/instrument/0"),
        Err(ValidationError::InvalidInstrumentId { .. })
    ));
    for path in ["favorites", "/unknown", "/instrument/1/extra", ""] {
        assert!(
            matches!(Route::parse(path), Err(ValidationError::UnknownRoute { .. })),
            "{path:?}"
        );
    }
}

// =============================================================================
// Navigation menu
// =============================================================================

#[test]
fn menu_and_greeting_follow_the_session() {
    // Given: an anonymous session
    let anonymous = SessionState::new();
    assert!(nav_links(&anonymous).is_empty());
    assert_eq!(greeting(&anonymous), None);

    // When: an admin signs in
    let admin = anonymous.reduce(SessionAction::Restore(credential(Role::Admin)));

    // Then: the admin entry appears after the regular ones
    let labels: Vec<&str> = nav_links(&admin).iter().map(|link| link.label).collect();
    assert_eq!(labels, vec!["Instrumentos", "Favoritos", "Usuarios"]);
    assert_eq!(greeting(&admin).as_deref(), Some("Hola, Ana"));

    // And: signing out empties the menu again
    assert!(nav_links(&admin.reduce(SessionAction::Logout)).is_empty());
}
