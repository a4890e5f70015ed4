use std::thread;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };

use log::{ debug, info };

use crate::canvas::Canvas;
use crate::error::{ Error, Result };
use crate::scene::Scene;

pub enum Message {
    Row(usize),
    Terminate,
}

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, scene: Arc<Scene>, canvas: Arc<Mutex<Canvas>>,
        receiver: Arc<Mutex<mpsc::Receiver<Message>>>) -> Worker {

        let thread = thread::spawn(move || loop {
            // A poisoned receiver means another worker panicked mid-receive.
            let message = match receiver.lock() {
                Ok(receiver) => receiver.recv(),
                Err(_) => break,
            };

            match message {
                Ok(Message::Row(y)) => {
                    // Trace the row without holding the canvas lock.
                    let row = scene.render_row(y);
                    match canvas.lock() {
                        Ok(mut canvas) => canvas.write_row(y, &row),
                        Err(_) => break,
                    }
                },

                Ok(Message::Terminate) | Err(_) => {
                    debug!("worker {} exiting", id);
                    break;
                }
            }
        });

        Worker { id, thread: Some(thread) }
    }
}

pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
}

impl ThreadPool {
    pub fn new(size: usize, scene: Arc<Scene>, canvas: Arc<Mutex<Canvas>>)
        -> Result<ThreadPool> {
        // There should be at least one thread to run workers.
        if size == 0 {
            return Err(Error::Render(
                "thread pool needs at least one worker".to_string()
            ));
        }

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            workers.push(Worker::new(
                id,
                Arc::clone(&scene),
                Arc::clone(&canvas),
                Arc::clone(&receiver)
            ));
        }

        Ok(ThreadPool { workers, sender })
    }

    pub fn execute(&self, message: Message) -> Result<()> {
        self.sender.send(message).map_err(|_| {
            Error::Render("all workers have exited".to_string())
        })
    }

    /// Stops every worker after the queued messages and waits for them.
    ///
    /// Fails if any worker panicked.
    pub fn join(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        for _ in &self.workers {
            // Workers that already exited have dropped their receiver share;
            // the send only fails once all of them are gone.
            let _ = self.sender.send(Message::Terminate);
        }

        let mut panicked = Vec::new();
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    panicked.push(worker.id);
                }
            }
        }

        if panicked.is_empty() {
            Ok(())
        } else {
            Err(Error::Render(format!("workers {:?} panicked", panicked)))
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Renders a scene with `threads` workers, one image row per message.
///
/// The result is identical to `Scene::render`; a single thread renders on
/// the calling thread without a pool.
pub fn render(scene: &Scene, threads: usize) -> Result<Canvas> {
    if threads <= 1 {
        return Ok(scene.render());
    }

    let (width, height) = scene.camera.canvas_size();
    let canvas = Arc::new(Mutex::new(Canvas::new(width, height)));

    info!("rendering {}x{} image on {} threads", width, height, threads);
    let pool = ThreadPool::new(threads, Arc::new(scene.clone()),
        Arc::clone(&canvas))?;

    for y in 0..height {
        pool.execute(Message::Row(y))?;
    }
    pool.join()?;

    let canvas = Arc::try_unwrap(canvas)
        .map_err(|_| Error::Render("canvas is still shared".to_string()))?;
    canvas.into_inner()
        .map_err(|_| Error::Render("canvas lock was poisoned".to_string()))
}

/* Tests */

#[cfg(test)]
fn small_demo() -> Scene {
    let mut scene = Scene::demo();
    scene.camera.frustum.width = 40.0;
    scene.camera.frustum.height = 30.0;

    scene
}

#[test]
fn parallel_matches_sequential() {
    let scene = small_demo();
    let expected = scene.render();

    for threads in [1, 2, 3, 7].iter() {
        assert_eq!(render(&scene, *threads).unwrap(), expected);
    }
}

#[test]
fn more_threads_than_rows() {
    let mut scene = small_demo();
    scene.camera.frustum.height = 2.0;

    assert_eq!(render(&scene, 8).unwrap(), scene.render());
}

#[test]
fn empty_pool_is_rejected() {
    let canvas = Arc::new(Mutex::new(Canvas::new(1, 1)));

    assert!(ThreadPool::new(0, Arc::new(Scene::demo()), canvas).is_err());
}
