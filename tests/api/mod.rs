//! REST API tests against the in-memory backend

mod chat_tests;
mod folder_tests;
mod health_tests;
mod message_tests;
mod privacy_tests;
