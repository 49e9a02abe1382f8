//! Client stubs for the outbound services, vendored so builds do not
//! require `protoc`. Kept in lockstep with the definitions under `proto/`;
//! regenerating with `tonic-build` (clients only) yields the same surface.

pub mod auth {
    include!("auth.v1.rs");
}

pub mod vacancy {
    include!("vacancy.v1.rs");
}
