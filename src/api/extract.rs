//! Caller identity extraction.
//!
//! Authentication happens upstream; the auth layer forwards the caller's
//! role and ids in `x-actor-*` headers, which are turned into an [`Actor`]
//! here.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Role};

use super::response::ApiErrorResponse;

/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-actor-role";
/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-actor-user-id";
/// Header carrying the caller's linked employee id.
pub const EMPLOYEE_ID_HEADER: &str = "x-actor-employee-id";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> EngineResult<Option<&'a str>> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| EngineError::invalid_input(format!("invalid {name} header")))
        })
        .transpose()
}

fn uuid_header(headers: &HeaderMap, name: &str) -> EngineResult<Option<Uuid>> {
    header(headers, name)?
        .map(|value| {
            value
                .parse()
                .map_err(|_| EngineError::invalid_input(format!("invalid {name} header")))
        })
        .transpose()
}

/// Builds the actor from the forwarded identity headers.
pub fn actor_from_headers(headers: &HeaderMap) -> EngineResult<Actor> {
    let role: Role = header(headers, ROLE_HEADER)?
        .ok_or_else(|| EngineError::forbidden("missing caller identity"))?
        .parse()?;
    let user_id = uuid_header(headers, USER_ID_HEADER)?
        .ok_or_else(|| EngineError::forbidden("missing caller identity"))?;
    let employee_id = uuid_header(headers, EMPLOYEE_ID_HEADER)?;

    Ok(Actor {
        role,
        user_id,
        employee_id,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentActor(actor_from_headers(&parts.headers)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_employee_actor_from_headers() {
        let user = Uuid::new_v4();
        let employee = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, HeaderValue::from_static("employee"));
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&user.to_string()).unwrap());
        headers.insert(
            EMPLOYEE_ID_HEADER,
            HeaderValue::from_str(&employee.to_string()).unwrap(),
        );

        let actor = actor_from_headers(&headers).unwrap();
        assert_eq!(actor, Actor::employee(user, employee));
    }

    #[test]
    fn test_missing_role_is_forbidden() {
        let err = actor_from_headers(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, EngineError::Forbidden { .. }));
    }

    #[test]
    fn test_malformed_ids_are_invalid_input() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, HeaderValue::from_static("admin"));
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        let err = actor_from_headers(&headers).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_unknown_role_is_invalid_input() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, HeaderValue::from_static("owner"));
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
        );
        assert!(matches!(
            actor_from_headers(&headers),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}
