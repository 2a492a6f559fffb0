//! Authentication DTOs, re-exported from `quill-models`.

pub use quill_auth::Claims;
pub use quill_models::auth::{
    AuthResponse, ForgotPasswordDto, MessageResponse, ResetPasswordDto, SigninDto, SignupDto,
    VerifyEmailDto,
};
