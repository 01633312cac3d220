//! Authentication-gated dispatch of send and draft requests
//!
//! # States
//!
//! - **Idle**: nothing dispatched yet
//! - **Authenticating**: waiting on the [`AuthProvider`] gate
//! - **Dispatching**: the [`MailTransport`] call is in flight
//! - **Succeeded** / **Failed**: outcome of the last call
//!
//! Each call makes exactly one transport attempt. Callers re-invoke on
//! failure if they want another try.

use tracing::{debug, error, info, warn};

use crate::audit::AuditLog;
use crate::auth::AuthProvider;
use crate::config::Config;
use crate::error::{Result, SenderError};
use crate::models::{DispatchMode, EmailRequest};
use crate::transport::MailTransport;

/// Dispatcher lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Authenticating,
    Dispatching,
    Succeeded,
    Failed,
}

pub struct EmailDispatcher {
    auth: Box<dyn AuthProvider>,
    transport: Box<dyn MailTransport>,
    audit_log: AuditLog,
    log_sent_emails: bool,
    authenticated: bool,
    state: DispatchState,
}

impl EmailDispatcher {
    pub fn new(
        auth: Box<dyn AuthProvider>,
        transport: Box<dyn MailTransport>,
        config: &Config,
        audit_log: AuditLog,
    ) -> Self {
        Self {
            auth,
            transport,
            audit_log,
            log_sent_emails: config.log_sent_emails,
            authenticated: false,
            state: DispatchState::Idle,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Route by the request's mode
    pub async fn dispatch(&mut self, request: &EmailRequest) -> Result<()> {
        match request.mode {
            DispatchMode::Send => self.send(request).await,
            DispatchMode::Draft => self.create_draft(request).await,
        }
    }

    /// Send the message; appends to the audit log when enabled
    pub async fn send(&mut self, request: &EmailRequest) -> Result<()> {
        ensure_recipients(request)?;
        self.authenticate().await?;

        self.state = DispatchState::Dispatching;
        debug!("Delivering email to {}", request.recipient_line());
        if let Err(e) = self.transport.deliver(request).await {
            return Err(self.fail(e));
        }

        self.state = DispatchState::Succeeded;
        info!("Email sent to {}", request.recipient_line());

        if self.log_sent_emails {
            // Best effort: the mail is already out
            if let Err(e) = self
                .audit_log
                .append(&request.recipient_line(), &request.subject)
                .await
            {
                warn!("Failed to record sent email: {}", e);
            }
        }
        Ok(())
    }

    /// Store the message as a draft; drafts are never audited
    pub async fn create_draft(&mut self, request: &EmailRequest) -> Result<()> {
        ensure_recipients(request)?;
        self.authenticate().await?;

        self.state = DispatchState::Dispatching;
        debug!("Saving draft to {}", request.recipient_line());
        if let Err(e) = self.transport.save_draft(request).await {
            return Err(self.fail(e));
        }

        self.state = DispatchState::Succeeded;
        info!("Draft created for {}", request.recipient_line());
        Ok(())
    }

    async fn authenticate(&mut self) -> Result<()> {
        if self.authenticated {
            return Ok(());
        }

        self.state = DispatchState::Authenticating;
        if self.auth.ensure_authenticated().await {
            self.authenticated = true;
            Ok(())
        } else {
            Err(self.fail(SenderError::AuthError("credentials are not ready".to_string())))
        }
    }

    fn fail(&mut self, err: SenderError) -> SenderError {
        self.state = DispatchState::Failed;
        error!("{}", err);
        match err {
            e @ (SenderError::AuthError(_) | SenderError::TransportError(_)) => e,
            other => SenderError::TransportError(other.to_string()),
        }
    }
}

fn ensure_recipients(request: &EmailRequest) -> Result<()> {
    if request.to.iter().all(|to| to.trim().is_empty()) {
        return Err(SenderError::Validation(
            "at least one recipient is required".to_string(),
        ));
    }
    Ok(())
}
