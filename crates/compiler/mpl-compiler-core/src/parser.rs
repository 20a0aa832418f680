//! Recursive-descent parser for MPL.
//!
//! ```text
//! document        := block*
//! block           := pose_block | animation_block | main_block
//! pose_block      := '@pose' IDENT '{' statement* '}'
//! statement       := IDENT (action_clause (',' action_clause)* | 'reset') ';'
//! action_clause   := ACTION DIRECTION NUMBER
//! animation_block := '@animation' IDENT '{' keyframe* '}'
//! keyframe        := NUMBER ':' IDENT ';'
//! main_block      := 'main' '{' (IDENT ';')* '}'
//! ```
//!
//! Each block keyword and each statement's leading identifier selects the production,
//! so the parser never backtracks.

use indexmap::map::Entry;

use crate::ast::*;
use crate::bones::{axis_for, Action, BoneId, Direction};
use crate::config::InputLimits;
use crate::error::{CompileError, IdentKind};
use crate::lexer::{Lexer, Token, TokenKind};

/// Parse MPL source with default input limits.
pub fn parse(source: &str) -> Result<Document, CompileError> {
    parse_with_limits(source, &InputLimits::default())
}

/// Parse MPL source, failing once any input limit is exceeded.
pub fn parse_with_limits(source: &str, limits: &InputLimits) -> Result<Document, CompileError> {
    if source.len() > limits.max_source_bytes {
        return Err(CompileError::too_large("source bytes", limits.max_source_bytes));
    }
    Parser::new(source, limits)?.parse_document()
}

/// Parser state.
pub struct Parser<'l> {
    tokens: Vec<Token>,
    pos: usize,
    limits: &'l InputLimits,
}

impl<'l> Parser<'l> {
    pub fn new(source: &str, limits: &'l InputLimits) -> Result<Self, CompileError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            limits,
        })
    }

    // ==================== TOKEN HELPERS ====================

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof and advance() never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn check_word(&self, word: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    fn error_here(&self, expected: &str) -> CompileError {
        let token = self.peek();
        CompileError::syntax(
            token.span,
            format!("expected {expected}, found {}", token.kind.describe()),
        )
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(expected))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<(String, Span), CompileError> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            _ => Err(self.error_here(expected)),
        }
    }

    fn expect_number(&mut self, expected: &str) -> Result<(f64, Span), CompileError> {
        match self.peek().kind {
            TokenKind::Number(n) => {
                let span = self.advance().span;
                Ok((n, span))
            }
            _ => Err(self.error_here(expected)),
        }
    }

    /// Expect the `}` closing `what`, reporting unterminated blocks at end of input.
    fn expect_close(&mut self, what: &str) -> Result<(), CompileError> {
        self.expect(&TokenKind::RBrace, &format!("'}}' to close {what}"))?;
        Ok(())
    }

    fn at_block_end(&self) -> bool {
        self.check(&TokenKind::RBrace) || self.check(&TokenKind::Eof)
    }

    // ==================== BLOCKS ====================

    pub fn parse_document(&mut self) -> Result<Document, CompileError> {
        let mut doc = Document::default();
        let mut main_seen = false;

        loop {
            let token = self.peek().clone();
            match &token.kind {
                TokenKind::Eof => break,
                TokenKind::BlockKeyword(k) if k == "pose" => {
                    let pose = self.parse_pose()?;
                    if doc.poses.len() >= self.limits.max_poses {
                        return Err(CompileError::too_large("pose count", self.limits.max_poses));
                    }
                    match doc.poses.entry(pose.name.clone()) {
                        Entry::Occupied(_) => {
                            return Err(CompileError::duplicate(IdentKind::Pose, pose.name, pose.span))
                        }
                        Entry::Vacant(slot) => {
                            slot.insert(pose);
                        }
                    }
                }
                TokenKind::BlockKeyword(k) if k == "animation" => {
                    let anim = self.parse_animation()?;
                    if doc.animations.len() >= self.limits.max_animations {
                        return Err(CompileError::too_large(
                            "animation count",
                            self.limits.max_animations,
                        ));
                    }
                    match doc.animations.entry(anim.name.clone()) {
                        Entry::Occupied(_) => {
                            return Err(CompileError::duplicate(
                                IdentKind::Animation,
                                anim.name,
                                anim.span,
                            ))
                        }
                        Entry::Vacant(slot) => {
                            slot.insert(anim);
                        }
                    }
                }
                TokenKind::Ident(k) if k == "main" => {
                    if main_seen {
                        return Err(CompileError::duplicate(IdentKind::MainBlock, "main", token.span));
                    }
                    main_seen = true;
                    doc.main = self.parse_main()?;
                }
                TokenKind::BlockKeyword(k) => {
                    return Err(CompileError::syntax(
                        token.span,
                        format!("unknown block keyword '@{k}'; expected '@pose', '@animation' or 'main'"),
                    ))
                }
                other => {
                    return Err(CompileError::syntax(
                        token.span,
                        format!(
                            "unknown block keyword {}; expected '@pose', '@animation' or 'main'",
                            other.describe()
                        ),
                    ))
                }
            }
        }

        Ok(doc)
    }

    fn parse_pose(&mut self) -> Result<Pose, CompileError> {
        let kw = self.advance();
        let (name, _) = self.expect_ident("pose name after '@pose'")?;
        self.expect(&TokenKind::LBrace, &format!("'{{' after pose name '{name}'"))?;

        let mut statements = Vec::new();
        while !self.at_block_end() {
            statements.push(self.parse_statement()?);
        }
        self.expect_close(&format!("pose '{name}'"))?;

        Ok(Pose {
            name,
            statements,
            span: kw.span,
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, CompileError> {
        let (bone_name, span) = self.expect_ident("bone name")?;
        let bone = BoneId::from_name(&bone_name)
            .ok_or_else(|| CompileError::unknown(IdentKind::Bone, &bone_name, span))?;

        let kind = if self.check_word("reset") {
            self.advance();
            StatementKind::Reset
        } else {
            let mut clauses = vec![self.parse_clause(&bone_name, true)?];
            while self.check(&TokenKind::Comma) {
                self.advance();
                clauses.push(self.parse_clause(&bone_name, false)?);
            }
            StatementKind::Actions { clauses }
        };

        self.expect(&TokenKind::Semicolon, "';' after statement")?;
        Ok(Statement { bone, kind, span })
    }

    fn parse_clause(&mut self, bone: &str, first: bool) -> Result<ActionClause, CompileError> {
        let expected_action = if first {
            format!("action ('bend', 'turn', 'sway', 'move') or 'reset' after bone '{bone}'")
        } else {
            "action ('bend', 'turn', 'sway', 'move') after ','".to_string()
        };
        let (word, span) = self.expect_ident(&expected_action)?;
        let action = Action::from_word(&word).ok_or_else(|| {
            CompileError::syntax(span, format!("expected {expected_action}, found '{word}'"))
        })?;

        let expected_dir = format!("{} after '{}'", action.expected_directions(), action);
        let (word, dir_span) = self.expect_ident(&expected_dir)?;
        let direction = Direction::from_word(&word)
            .filter(|d| axis_for(action, *d).is_some())
            .ok_or_else(|| {
                CompileError::syntax(dir_span, format!("expected {expected_dir}, found '{word}'"))
            })?;

        let (magnitude, _) = self.expect_number(&format!("amount after '{action} {direction}'"))?;

        Ok(ActionClause {
            action,
            direction,
            magnitude,
            span,
        })
    }

    fn parse_animation(&mut self) -> Result<Animation, CompileError> {
        let kw = self.advance();
        let (name, _) = self.expect_ident("animation name after '@animation'")?;
        self.expect(&TokenKind::LBrace, &format!("'{{' after animation name '{name}'"))?;

        let mut keyframes = Vec::new();
        while !self.at_block_end() {
            let (time, span) = self.expect_number("keyframe time")?;
            self.expect(&TokenKind::Colon, "':' after keyframe time")?;
            let (pose, _) = self.expect_ident("pose name after ':'")?;
            self.expect(&TokenKind::Semicolon, "';' after keyframe")?;

            if keyframes.len() >= self.limits.max_keyframes_per_animation {
                return Err(CompileError::too_large(
                    format!("keyframe count of animation '{name}'"),
                    self.limits.max_keyframes_per_animation,
                ));
            }
            keyframes.push(AnimationKeyframe { time, pose, span });
        }
        self.expect_close(&format!("animation '{name}'"))?;

        Ok(Animation {
            name,
            keyframes,
            span: kw.span,
        })
    }

    fn parse_main(&mut self) -> Result<PlaySequence, CompileError> {
        self.advance();
        self.expect(&TokenKind::LBrace, "'{' after 'main'")?;

        let mut entries = Vec::new();
        while !self.at_block_end() {
            let (animation, span) = self.expect_ident("animation name")?;
            self.expect(&TokenKind::Semicolon, "';' after animation name")?;
            if entries.len() >= self.limits.max_play_entries {
                return Err(CompileError::too_large(
                    "main block entries",
                    self.limits.max_play_entries,
                ));
            }
            entries.push(PlayEntry { animation, span });
        }
        self.expect_close("'main'")?;

        Ok(PlaySequence { entries })
    }
}
