use anyhow::{Context, Result};
use console::style;

use crate::{
    config::ListConfig,
    domain::{HeldMessage, MessageAction, MessageReview, PendingSubscription, SubscriptionAction},
    infrastructure::terminal::Prompter,
    session::{HeldMessageDetails, SessionClient},
};

/// Body display stops after this many lines; full content stays on the
/// server.
const BODY_LINE_CAP: usize = 20;

const SUBSCRIPTION_CHOICES: &[char] = &['a', 'd', 'r', 's', 'q'];
const MESSAGE_CHOICES: &[char] = &['a', 'd', 'b', 'h', 's', 'q'];

const SUBSCRIPTION_PROMPT: &str = "(a)ccept, (d)iscard, (r)eject, (s)kip, (q)uit?";
const MESSAGE_PROMPT: &str = "(a)ccept, (d)iscard, (b)ody, (h)eaders, (s)kip, (q)uit?";

/// Runs the whole workflow for one list: subscription requests first, each
/// disposition applied immediately, then the held-message queue with
/// dispositions batched until one confirmation at the end.
pub async fn moderate_list(
    session: &SessionClient,
    config: &ListConfig,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    println!();
    println!("{}", style(&config.list).bold());

    let requests = session
        .fetch_subscription_requests(&config.list)
        .await
        .with_context(|| format!("failed to fetch subscription requests for {}", config.list))?;
    if requests.is_empty() {
        println!("no pending subscription requests");
    } else {
        println!("{} subscription request(s)", requests.len());
        review_subscriptions(session, &config.list, &requests, prompter).await?;
    }

    let messages = session
        .fetch_held_messages(&config.list)
        .await
        .with_context(|| format!("failed to fetch held messages for {}", config.list))?;
    if messages.is_empty() {
        println!("no held messages");
        return Ok(());
    }
    println!("{} held message(s)", messages.len());

    let review = review_messages(session, &config.list, &messages, prompter).await?;
    submit_review(session, &config.list, review, prompter).await
}

/// Subscription decisions apply one HTTP request at a time; quit leaves the
/// rest pending (nothing to roll back) and moves on to the message queue.
async fn review_subscriptions(
    session: &SessionClient,
    list: &str,
    requests: &[PendingSubscription],
    prompter: &mut dyn Prompter,
) -> Result<()> {
    for (idx, request) in requests.iter().enumerate() {
        let prompt = format!(
            "({}/{}) {} {}",
            idx + 1,
            requests.len(),
            style(&request.email).cyan(),
            SUBSCRIPTION_PROMPT
        );
        let action = match prompter.choose(&prompt, SUBSCRIPTION_CHOICES)? {
            'a' => SubscriptionAction::Accept,
            // Reject takes the discard path; the server exposes no separate
            // action for it here.
            'd' | 'r' => SubscriptionAction::Discard,
            's' => continue,
            'q' => break,
            _ => unreachable!(),
        };
        session
            .submit_subscription_disposition(list, action, &request.request_hash)
            .await
            .with_context(|| format!("failed to submit decision for {}", request.email))?;
    }
    Ok(())
}

/// Walks the queue collecting a disposition batch. Body and header requests
/// re-prompt the same item; quit keeps what was already queued.
async fn review_messages(
    details: &dyn HeldMessageDetails,
    list: &str,
    messages: &[HeldMessage],
    prompter: &mut dyn Prompter,
) -> Result<MessageReview> {
    let mut review = MessageReview::default();
    'queue: for (idx, message) in messages.iter().enumerate() {
        print_held_message(idx + 1, messages.len(), message);
        loop {
            match prompter.choose(MESSAGE_PROMPT, MESSAGE_CHOICES)? {
                'a' => {
                    review.accept.push(message.id.clone());
                    break;
                }
                'd' => {
                    review.discard.push(message.id.clone());
                    break;
                }
                'b' => show_detail(details, list, &message.id, DetailPart::Body).await?,
                'h' => show_detail(details, list, &message.id, DetailPart::Headers).await?,
                's' => break,
                'q' => break 'queue,
                _ => unreachable!(),
            }
        }
    }
    Ok(review)
}

fn print_held_message(position: usize, total: usize, message: &HeldMessage) {
    println!();
    println!(
        "({position}/{total}) {}",
        style(&message.subject).bold()
    );
    println!("  From:   {}", message.sender);
    println!("  Reason: {}", message.reason);
    println!("  Date:   {}", message.date);
}

#[derive(Clone, Copy)]
enum DetailPart {
    Body,
    Headers,
}

async fn show_detail(
    details: &dyn HeldMessageDetails,
    list: &str,
    id: &str,
    part: DetailPart,
) -> Result<()> {
    let detail = details
        .held_message_detail(list, id)
        .await
        .with_context(|| format!("failed to fetch detail for held message {id}"))?;
    let Some(detail) = detail else {
        println!("  (message detail unavailable)");
        return Ok(());
    };
    match part {
        DetailPart::Body => {
            for line in detail.body().lines().take(BODY_LINE_CAP) {
                println!("  {line}");
            }
        }
        DetailPart::Headers => {
            for line in detail.headers().lines() {
                println!("  {line}");
            }
        }
    }
    Ok(())
}

/// One confirmation for the whole batch. Bare newline means yes, `n` drops
/// both queues. Accept submits before discard; the two posts are
/// independent, a failure in the second leaves the first applied.
async fn submit_review(
    session: &SessionClient,
    list: &str,
    review: MessageReview,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    if review.is_empty() {
        return Ok(());
    }
    let prompt = format!(
        "submit {} accept / {} discard for {}? [yes]",
        review.accept.len(),
        review.discard.len(),
        list
    );
    let answer = prompter.read_line(&prompt)?;
    if !batch_confirmed(&answer) {
        println!("nothing submitted");
        return Ok(());
    }
    if !review.accept.is_empty() {
        session
            .submit_dispositions(list, MessageAction::Accept, &review.accept)
            .await
            .with_context(|| format!("failed to accept messages on {list}"))?;
    }
    if !review.discard.is_empty() {
        session
            .submit_dispositions(list, MessageAction::Discard, &review.discard)
            .await
            .with_context(|| format!("failed to discard messages on {list}"))?;
    }
    Ok(())
}

fn batch_confirmed(answer: &str) -> bool {
    !answer.trim().eq_ignore_ascii_case("n")
}
