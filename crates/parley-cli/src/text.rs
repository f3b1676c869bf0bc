//! Plain-text driver.
//!
//! Implements [`Driver`] by writing one line per visible change to any
//! [`io::Write`]. Full-region redraws are left to [`write_sidebar`].

use std::io::{self, Write};

use parley_app::{AppAction, ChannelKind, CurrentChannel, Driver, Session, UserPanel};
use parley_core::Backend;

/// Text driver writing change lines to `W`.
pub struct TextDriver<W: Write> {
    out: W,
}

impl<W: Write> TextDriver<W> {
    /// Driver writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Output sink.
    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Consume the driver, returning the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write, B: Backend> Driver<B> for TextDriver<W> {
    type Error = io::Error;

    fn render(&mut self, session: &Session<B>, action: &AppAction) -> Result<(), Self::Error> {
        match action {
            AppAction::ActiveChannelChanged(current) => {
                writeln!(self.out, "-> {}", label(current))
            },
            AppAction::RenderBadge { channel_id } => {
                let name = channel_name(session, channel_id);
                match session.unread_count(channel_id) {
                    Some(n) => writeln!(self.out, "   #{name} has {n} unread"),
                    None => Ok(()),
                }
            },
            AppAction::RenderPeerStatus { peer_id } => {
                let name = session
                    .peers()
                    .iter()
                    .find(|p| p.peer_id == *peer_id)
                    .map_or(peer_id.as_str(), |p| p.profile.name.as_str());
                writeln!(self.out, "   @{name} is {}", session.peer_status(peer_id))
            },
            AppAction::RenderChannels | AppAction::RenderPeers | AppAction::RenderStarred => {
                tracing::trace!(?action, "region redraw");
                Ok(())
            },
        }
    }
}

/// Write the whole sidebar: user panel, starred, channels, direct messages.
pub fn write_sidebar<B: Backend, W: Write>(
    out: &mut W,
    session: &Session<B>,
    panel: &UserPanel,
) -> io::Result<()> {
    let menu: Vec<_> = panel.menu_options().iter().map(|o| format!("[{}]", o.label())).collect();
    writeln!(out, "{}  {}", panel.display_name(), menu.join(" "))?;

    let active = session.active_channel_id();
    let marker = |id: &str| if active == Some(id) { '>' } else { ' ' };

    writeln!(out, "STARRED ({})", session.starred().len())?;
    for channel in session.starred().channels() {
        writeln!(out, "{} #{}", marker(&channel.id), channel.name)?;
    }

    writeln!(out, "CHANNELS ({})", session.channels().len())?;
    for channel in session.channels() {
        match session.unread_count(&channel.id) {
            Some(n) => writeln!(out, "{} #{} ({n})", marker(&channel.id), channel.name)?,
            None => writeln!(out, "{} #{}", marker(&channel.id), channel.name)?,
        }
    }

    writeln!(out, "DIRECT MESSAGES ({})", session.peers().len())?;
    let direct_peer = session.current_channel().and_then(|c| match &c.kind {
        ChannelKind::Direct { peer } => Some(peer.as_str()),
        ChannelKind::Public => None,
    });
    for peer in session.peers() {
        let mark = if direct_peer == Some(peer.peer_id.as_str()) { '>' } else { ' ' };
        writeln!(out, "{mark} @{} ({})", peer.profile.name, peer.status)?;
    }
    Ok(())
}

fn label(current: &CurrentChannel) -> String {
    match current.kind {
        ChannelKind::Public => format!("#{}", current.name),
        ChannelKind::Direct { .. } => format!("@{} (direct)", current.name),
    }
}

fn channel_name<'a, B: Backend>(session: &'a Session<B>, channel_id: &'a str) -> &'a str {
    session
        .roster()
        .get(channel_id)
        .or_else(|| session.starred().get(channel_id))
        .map_or(channel_id, |c| c.name.as_str())
}
