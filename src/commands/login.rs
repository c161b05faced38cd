use std::task::{Context, Poll};

use tower::Service;
use tracing::{info, warn};

use crate::{
    domain::MemberInfo,
    ports::{
        member::MemberPort, password::PasswordPort, preference::PreferencePort, token::TokenPort,
    },
};

use super::{BoxFuture, DomainLogic, Error};

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub member_info: MemberInfo,
}

impl<M, P, H, T> Service<LoginRequest> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = LoginResponse;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: LoginRequest) -> Self::Future {
        let member = self.member.clone();
        let password = self.password.clone();
        let token = self.token.clone();
        Box::pin(async move {
            // Unknown email and wrong password are reported the same way
            let Some(found) = member.find_by_email(&req.email).await? else {
                warn!(email = %req.email, "login rejected: unknown email");
                return Err(Error::InvalidCredentials);
            };
            if !password.verify(&req.password, &found.password)? {
                warn!(member_id = found.id, "login rejected: wrong password");
                return Err(Error::InvalidCredentials);
            }

            let token = token.issue(found.id)?;
            info!(member_id = found.id, "member logged in");
            Ok(LoginResponse {
                token,
                member_info: found.info(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commands::tests::*,
        ports::{
            member::MockMemberPort, password::MockPasswordPort, preference::MockPreferencePort,
            token::MockTokenPort,
        },
    };
    use mockall::predicate::*;
    use speculoos::prelude::*;
    use tower::ServiceExt;

    fn request(password: &str) -> LoginRequest {
        LoginRequest {
            email: EMAIL.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login() {
        // GIVEN
        // * a registered member
        // * a matching password
        let mut member_port = MockMemberPort::new();
        member_port
            .expect_find_by_email()
            .with(eq(EMAIL))
            .times(1)
            .returning(|_| Ok(Some(member())));
        let mut password = MockPasswordPort::new();
        password
            .expect_verify()
            .with(eq(PASSWORD), eq(PASSWORD))
            .times(1)
            .returning(|_, _| Ok(true));
        let mut token = MockTokenPort::new();
        token
            .expect_issue()
            .with(eq(MEMBER_ID))
            .times(1)
            .returning(|_| Ok("token".to_string()));
        let domain = logic(member_port, MockPreferencePort::new(), password, token);

        // WHEN logging in
        let res = domain.oneshot(request(PASSWORD)).await;

        // THEN it returns a token and the member info
        assert_that!(res).is_ok().is_equal_to(LoginResponse {
            token: "token".to_string(),
            member_info: member().info(),
        });
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut member_port = MockMemberPort::new();
        member_port
            .expect_find_by_email()
            .returning(|_| Ok(Some(member())));
        let mut password = MockPasswordPort::new();
        password.expect_verify().returning(|_, _| Ok(false));
        let mut token = MockTokenPort::new();
        token.expect_issue().never();
        let domain = logic(member_port, MockPreferencePort::new(), password, token);

        let res = domain.oneshot(request("wrong")).await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut member_port = MockMemberPort::new();
        member_port.expect_find_by_email().returning(|_| Ok(None));
        let mut password = MockPasswordPort::new();
        password.expect_verify().never();
        let domain = logic(
            member_port,
            MockPreferencePort::new(),
            password,
            MockTokenPort::new(),
        );

        let res = domain.oneshot(request(PASSWORD)).await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidCredentials));
    }
}
