//! User types used by the users module, re-exported from `quill-models`.

pub use quill_models::users::{
    AdminUpdateUserDto, ChangePasswordDto, NewUser, PaginatedUsersResponse, ProfileImageDto,
    SaveOutcome, UpdateProfileDto, User, UserPatch, UserProfile, UserType,
};
