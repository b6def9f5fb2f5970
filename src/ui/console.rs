//! Console Event Sink
//!
//! Renders pipeline events as human-readable progress lines on stderr.
//! Stdout is kept for deployment outputs so scripts can capture them.

use std::io::{self, Write};
use std::sync::Mutex;

use iacdeploy::domain::ports::{DeployEvent, DeployEventSink};
use iacdeploy::DeploymentState;

use crate::ui::context::UiContext;
use crate::ui::theme::{colors, paint, Icon};

pub struct ConsoleEventSink {
    ctx: UiContext,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEventSink {
    pub fn stderr(ctx: UiContext) -> Self {
        Self::with_writer(ctx, io::stderr())
    }

    pub fn with_writer<W: Write + Send + 'static>(ctx: UiContext, writer: W) -> Self {
        Self {
            ctx,
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        let Some(line) = render_event(&event, &self.ctx) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

/// One progress line per event; `None` for events shown elsewhere
pub fn render_event(event: &DeployEvent, ctx: &UiContext) -> Option<String> {
    let (color, unicode) = (ctx.color, ctx.unicode);
    let icon = |i: Icon| i.render(color, unicode);

    let line = match event {
        DeployEvent::Started {
            command,
            template,
            scope,
        } => format!(
            "{} iacdeploy {}\n{} {}\n{} {}",
            icon(Icon::Deploy),
            command,
            paint("Template:", colors::DIM, color),
            template.display(),
            paint("Scope:   ", colors::DIM, color),
            scope
        ),

        DeployEvent::TokensReplaced {
            path,
            replaced,
            unresolved,
        } => {
            let mut line = format!(
                "{} Replaced {} token(s) in {}",
                icon(Icon::Success),
                replaced,
                path.display()
            );
            if !unresolved.is_empty() {
                line.push_str(&format!(
                    "\n{} Left without a value: {}",
                    icon(Icon::Warning),
                    unresolved.join(", ")
                ));
            }
            line
        }

        DeployEvent::Validated { template } => {
            format!("{} Template valid: {}", icon(Icon::Success), template.display())
        }

        DeployEvent::DeploymentStarted { name, attempt } => {
            if *attempt > 1 {
                format!(
                    "{} Deploying {} (attempt {})",
                    icon(Icon::Progress),
                    paint(name, colors::INFO, color),
                    attempt
                )
            } else {
                format!("{} Deploying {}", icon(Icon::Progress), paint(name, colors::INFO, color))
            }
        }

        DeployEvent::DeploymentFinished { name, state, error } => match (state, error) {
            (DeploymentState::Succeeded, _) => {
                format!("{} Deployment {} succeeded", icon(Icon::Success), name)
            }
            (state, Some(error)) => format!(
                "{} Deployment {} {}: {}",
                icon(Icon::Error),
                name,
                state,
                error
            ),
            (state, None) => format!(
                "{} Deployment {} {}",
                icon(Icon::Error),
                name,
                state
            ),
        },

        // Printed to stdout by the command once the run is over
        DeployEvent::OutputPublished { .. } => return None,

        DeployEvent::RemovalStarted { name, resources } => format!(
            "{} Removing {} resource(s) of {}",
            icon(Icon::Trash),
            resources,
            name
        ),

        DeployEvent::ResourceRemoved { resource_id } => {
            format!("  {} {}", icon(Icon::Success), resource_id)
        }

        DeployEvent::ResourceAbsent { resource_id } => format!(
            "  {} {} {}",
            icon(Icon::Pending),
            resource_id,
            paint("(already absent)", colors::DIM, color)
        ),

        DeployEvent::RemovalWarning {
            resource_id,
            message,
        } => format!(
            "  {} {}\n    {} {}",
            icon(Icon::Warning),
            resource_id,
            icon(Icon::Arrow),
            message
        ),

        DeployEvent::Completed {
            success, warnings, ..
        } => {
            let suffix = match warnings {
                0 => String::new(),
                n => format!(" ({} warning(s))", n),
            };
            if *success {
                format!("{} Done{}", icon(Icon::Success), suffix)
            } else {
                format!("{} Failed{}", icon(Icon::Error), suffix)
            }
        }
    };
    Some(line)
}
