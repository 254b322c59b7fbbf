//! Handler results, request state and the shared access gates

use crate::routes::Route;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use quillpress_core::policy::{Actor, Authored, Decision, Policy};
use quillpress_core::{Error, FormErrors, Message, Messages, Result};
use serde::Serialize;
use tracing::debug;

/// What a handler asks the presentation layer to do
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome<T> {
	/// Show a page built from `context`
	Render { title: String, context: T },
	/// Send the client elsewhere, showing `messages` once
	Redirect { to: String, messages: Vec<Message> },
	/// Re-show the submitted form with its errors
	Invalid(FormErrors),
	NotFound,
}

impl<T> Outcome<T> {
	pub fn render(title: impl Into<String>, context: T) -> Self {
		Outcome::Render {
			title: title.into(),
			context,
		}
	}

	pub fn is_redirect(&self) -> bool {
		matches!(self, Outcome::Redirect { .. })
	}

	/// Redirect target, if any
	pub fn location(&self) -> Option<&str> {
		match self {
			Outcome::Redirect { to, .. } => Some(to),
			_ => None,
		}
	}

	/// Rendered context, if any
	pub fn context(&self) -> Option<&T> {
		match self {
			Outcome::Render { context, .. } => Some(context),
			_ => None,
		}
	}
}

/// Per-request state: who is acting, the requested path and pending notices
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	pub actor: Actor,
	pub path: String,
	pub messages: Messages,
}

impl RequestContext {
	pub fn new(actor: Actor, path: impl Into<String>) -> Self {
		Self {
			actor,
			path: path.into(),
			messages: Messages::new(),
		}
	}

	pub fn anonymous(path: impl Into<String>) -> Self {
		Self::new(Actor::Anonymous, path)
	}

	/// Redirect to `route` carrying the pending messages
	pub fn redirect<T>(&mut self, route: Route) -> Outcome<T> {
		self.redirect_to(route.path())
	}

	pub fn redirect_to<T>(&mut self, to: impl Into<String>) -> Outcome<T> {
		Outcome::Redirect {
			to: to.into(),
			messages: self.messages.take(),
		}
	}
}

/// Bytes escaped in the `next` query value; `/` is left readable
const NEXT_VALUE: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'%')
	.add(b'&')
	.add(b'+')
	.add(b'<')
	.add(b'=')
	.add(b'>')
	.add(b'?')
	.add(b'`')
	.add(b'{')
	.add(b'}');

/// Login entry point with the current path as `next`
fn login_redirect<T>(ctx: &mut RequestContext, login_url: &str) -> Outcome<T> {
	let to = format!("{}?next={}", login_url, utf8_percent_encode(&ctx.path, NEXT_VALUE));
	ctx.redirect_to(to)
}

/// Turns a policy decision into the redirect it implies, `None` when allowed
fn gate<T>(ctx: &mut RequestContext, decision: Decision) -> Option<Outcome<T>> {
	match decision {
		Decision::Allow => None,
		Decision::RequireAuth { login_url } => Some(login_redirect(ctx, &login_url)),
		Decision::DenyWithNotice(message) => {
			ctx.messages.add(message);
			Some(ctx.redirect(Route::Home))
		}
	}
}

/// Redirects anonymous actors to the login entry point
pub fn login_required<T>(policy: &Policy, ctx: &mut RequestContext) -> Option<Outcome<T>> {
	let decision = policy.login_required(&ctx.actor);
	gate(ctx, decision)
}

/// Redirects anyone but the author of `entity`
pub fn author_required<T, E: Authored + ?Sized>(
	policy: &Policy,
	ctx: &mut RequestContext,
	entity: &E,
) -> Option<Outcome<T>> {
	let decision = policy.authorize(&ctx.actor, entity);
	gate(ctx, decision)
}

/// Maps the recoverable errors of a service call onto an outcome
///
/// Storage, credential and configuration failures are returned as errors.
pub fn recover<T>(policy: &Policy, ctx: &mut RequestContext, err: Error) -> Result<Outcome<T>> {
	match err {
		Error::Validation(errors) => {
			debug!(path = %ctx.path, %errors, "form rejected");
			Ok(Outcome::Invalid(errors))
		}
		Error::NotFound { entity, lookup } => {
			debug!(path = %ctx.path, entity, %lookup, "not found");
			Ok(Outcome::NotFound)
		}
		Error::AuthenticationRequired => Ok(login_redirect(ctx, policy.login_url())),
		Error::PermissionDenied(notice) => {
			ctx.messages.info(notice);
			Ok(ctx.redirect(Route::Home))
		}
		other => Err(other),
	}
}

/// Runs `result` through [`recover`], mapping success with `on_ok`
pub fn settle<T, U>(
	policy: &Policy,
	ctx: &mut RequestContext,
	result: Result<U>,
	on_ok: impl FnOnce(&mut RequestContext, U) -> Outcome<T>,
) -> Result<Outcome<T>> {
	match result {
		Ok(value) => Ok(on_ok(ctx, value)),
		Err(err) => recover(policy, ctx, err),
	}
}
